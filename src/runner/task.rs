//! Task model
//!
//! A [`Task`] is one node of an execution tree: an optional command with its
//! arguments, plus the child tasks that run before it. [`Tasks`] is the registry
//! of named tasks loaded from configuration.

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

/// Environment variable overrides, keyed by (case-sensitive) name
pub type EnvMap = BTreeMap<String, String>;

/// A single invocable unit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Task {
    /// Registry name (absent for ad-hoc command-line tasks)
    pub name: Option<String>,

    /// One-line description for listings
    pub help: Option<String>,

    /// Command text; empty for a purely composite task
    pub cmd: String,

    /// Arguments appended to `cmd`
    pub args: Vec<String>,

    /// Child tasks run before this task's own command
    pub depends: Vec<Task>,

    /// Working directory override, relative to the inherited one
    pub cwd: Option<PathBuf>,

    /// Environment overrides, applied after `env_file`
    pub env: EnvMap,

    /// File of `KEY=VALUE` lines applied before `env`
    pub env_file: Option<PathBuf>,

    /// Run `depends` concurrently instead of in order
    pub parallel: bool,

    /// A failure of this task does not halt its siblings or parent
    pub suppress_failure: bool,
}

impl Task {
    /// Create a leaf task that runs `cmd`
    pub fn command(cmd: impl Into<String>) -> Self {
        Task {
            cmd: cmd.into(),
            ..Task::default()
        }
    }

    /// Create a composite task over `depends`
    pub fn composite(depends: Vec<Task>) -> Self {
        Task {
            depends,
            ..Task::default()
        }
    }

    /// Set the arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set the registry name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Mark this task's failures as non-fatal for its parent
    pub fn suppressed(mut self) -> Self {
        self.suppress_failure = true;
        self
    }

    /// Whether this task runs a command of its own
    pub fn has_command(&self) -> bool {
        !self.cmd.is_empty()
    }

    /// Whether this task only sequences its dependencies
    pub fn is_composite(&self) -> bool {
        !self.has_command() && !self.depends.is_empty()
    }

    /// Human readable label used in messages
    pub fn label(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        if self.args.is_empty() {
            self.cmd.clone()
        } else {
            format!("{} {}", self.cmd, self.args.join(" "))
        }
    }

    /// Short summary of what the task does, for listings
    pub fn summary(&self) -> String {
        if let Some(help) = &self.help {
            return help.clone();
        }
        let refs: Vec<String> = self
            .depends
            .iter()
            .map(|dep| {
                let marker = if dep.suppress_failure { "+" } else { "" };
                format!("{}{}", marker, dep.label())
            })
            .collect();
        match (self.has_command(), refs.is_empty()) {
            (true, true) => self.cmd.clone(),
            (true, false) => format!("[{}] {}", refs.join(", "), self.cmd),
            (false, _) => format!("[{}]", refs.join(", ")),
        }
    }
}

/// Registry of named tasks
///
/// Lookups are by name; iteration follows insertion order. Re-inserting an
/// existing name replaces the task in place.
#[derive(Debug, Clone, Default)]
pub struct Tasks {
    entries: Vec<(String, Task)>,
    index: HashMap<String, usize>,
}

impl Tasks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a task, returning the task it replaced
    pub fn insert(&mut self, name: impl Into<String>, task: Task) -> Option<Task> {
        let name = name.into();
        match self.index.get(&name) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, task)),
            None => {
                self.index.insert(name.clone(), self.entries.len());
                self.entries.push((name, task));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Task names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// `(name, task)` pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.entries.iter().map(|(name, task)| (name.as_str(), task))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<N: Into<String>> FromIterator<(N, Task)> for Tasks {
    fn from_iter<I: IntoIterator<Item = (N, Task)>>(iter: I) -> Self {
        let mut tasks = Tasks::new();
        for (name, task) in iter {
            tasks.insert(name, task);
        }
        tasks
    }
}
