//! Composite task resolution
//!
//! Expands references to registry tasks in a parsed task tree. A reference whose
//! command is not a registry name is left alone and runs as a shell command.

use crate::error::{ConfigError, ConfigResult};
use crate::runner::{Task, Tasks};
use tracing::{debug, warn};

/// Resolves task references against a registry
pub struct Resolver<'a> {
    tasks: &'a Tasks,
    pre: bool,
    post: bool,
}

impl<'a> Resolver<'a> {
    pub fn new(tasks: &'a Tasks) -> Self {
        Resolver {
            tasks,
            pre: false,
            post: false,
        }
    }

    /// Also run `pre<name>` / `post<name>` registry tasks around each named task
    pub fn with_lifecycle(mut self, pre: bool, post: bool) -> Self {
        self.pre = pre;
        self.post = post;
        self
    }

    /// Resolve every child of `root`; the root's own fields are kept as they are
    pub fn resolve(&self, root: &Task) -> ConfigResult<Task> {
        let mut stack = Vec::new();
        let mut resolved = root.clone();
        resolved.depends = self.resolve_all(&root.depends, &mut stack)?;
        Ok(resolved)
    }

    fn resolve_all(&self, references: &[Task], stack: &mut Vec<String>) -> ConfigResult<Vec<Task>> {
        references
            .iter()
            .map(|reference| self.resolve_reference(reference, stack))
            .collect()
    }

    fn resolve_reference(&self, reference: &Task, stack: &mut Vec<String>) -> ConfigResult<Task> {
        let definition = match reference.name {
            None => self.tasks.get(&reference.cmd),
            Some(_) => None,
        };

        let Some(definition) = definition else {
            let mut literal = reference.clone();
            literal.depends = self.resolve_all(&reference.depends, stack)?;
            return Ok(literal);
        };

        let name = reference.cmd.as_str();
        let mut task = self.expand(name, definition, reference, stack)?;

        let pre = self.lifecycle_task(self.pre, "pre", name, stack)?;
        let post = self.lifecycle_task(self.post, "post", name, stack)?;
        if pre.is_none() && post.is_none() {
            return Ok(task);
        }

        // The wrapper takes over the failure policy so that pre/post follow the
        // main task's failures the same way its siblings would.
        let suppress = std::mem::take(&mut task.suppress_failure);
        let mut wrapper = Task::composite(pre.into_iter().chain([task]).chain(post).collect());
        wrapper.suppress_failure = suppress;
        Ok(wrapper)
    }

    fn expand(
        &self,
        name: &str,
        definition: &Task,
        reference: &Task,
        stack: &mut Vec<String>,
    ) -> ConfigResult<Task> {
        if stack.iter().any(|seen| seen == name) {
            let mut chain = stack.clone();
            chain.push(name.to_string());
            return Err(ConfigError::CircularDependency(chain.join(" -> ")));
        }

        debug!(task = name, args = ?reference.args, "resolving task reference");
        stack.push(name.to_string());

        let mut task = definition.clone();
        task.name = Some(name.to_string());
        task.suppress_failure = reference.suppress_failure;
        task.depends = self.resolve_all(&definition.depends, stack)?;

        if task.has_command() {
            task.args.extend(reference.args.iter().cloned());
        } else if !reference.args.is_empty() {
            warn!(
                task = name,
                args = ?reference.args,
                "ignoring arguments for a composite task without a command"
            );
        }

        stack.pop();
        Ok(task)
    }

    fn lifecycle_task(
        &self,
        enabled: bool,
        prefix: &str,
        name: &str,
        stack: &mut Vec<String>,
    ) -> ConfigResult<Option<Task>> {
        if !enabled {
            return Ok(None);
        }
        let hook = format!("{}{}", prefix, name);
        if !self.tasks.contains(&hook) {
            return Ok(None);
        }
        self.resolve_reference(&Task::command(hook), stack).map(Some)
    }
}

/// Resolve `root` against `tasks` without lifecycle tasks
pub fn resolve(root: &Task, tasks: &Tasks) -> ConfigResult<Task> {
    Resolver::new(tasks).resolve(root)
}
