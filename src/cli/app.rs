//! Main CLI application

use crate::cli::args::Args;
use crate::config::{
    expand_workspaces, filter_workspaces, find_config_file_from, find_config_in, load_config,
    LoadedConfig,
};
use crate::error::{ConfigError, DsError, Result};
use crate::git::{self, HookDiff};
use crate::runner::{
    parse_tokens, prepend_path, run, Context, EnvMap, HostEnv, Outcome, Resolver, Task, Tasks,
};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// CLI application
pub struct App {
    args: Args,
    host: HostEnv,
}

impl App {
    /// Create an app; relative path options are resolved against the host's cwd
    pub fn new(mut args: Args, host: HostEnv) -> Self {
        args.resolve_paths(&host.cwd);
        App { args, host }
    }

    /// Run the application, returning the process exit code
    pub fn run(self) -> Result<i32> {
        debug!(argv = ?self.args.as_argv(), "starting");
        let start_dir = self.args.cwd.clone().unwrap_or_else(|| self.host.cwd.clone());
        let config = self.load_config(&start_dir)?;

        if self.args.sync_git_hooks {
            let tasks = config.as_ref().map(|c| c.tasks.clone()).unwrap_or_default();
            self.sync_git_hooks(&start_dir, &tasks)?;
            if self.args.task.is_empty() {
                return Ok(0);
            }
        }

        if self.args.list || self.args.task.is_empty() {
            let tasks = config.as_ref().map(|c| c.tasks.clone()).unwrap_or_default();
            print_task_list(&tasks);
            return Ok(0);
        }

        // --cwd wins; otherwise tasks start next to the config file
        let working_dir = match (&self.args.cwd, &config) {
            (Some(cwd), _) => cwd.clone(),
            (None, Some(loaded)) => loaded.base_dir().to_path_buf(),
            (None, None) => self.host.cwd.clone(),
        };

        let mut root = parse_tokens(&self.args.task);
        root.env = self.args.env.clone();
        root.env_file = self.args.env_file.clone();
        root.parallel = self.args.parallel;

        let outcome = match &config {
            Some(loaded) if !self.args.workspace.is_empty() => {
                self.run_workspaces(loaded, &root)?
            }
            Some(loaded) => self.run_tasks(&root, &loaded.tasks, loaded, &working_dir)?,
            None => {
                if !self.args.workspace.is_empty() {
                    return Err(ConfigError::Invalid(
                        "--workspace requires a configuration file".to_string(),
                    )
                    .into());
                }
                let ctx = self.context(working_dir.clone(), None);
                let env = self.base_env(&working_dir)?;
                run(&Resolver::new(&Tasks::new()).resolve(&root)?, &env, &ctx)?
            }
        };

        Ok(outcome.exit_code())
    }

    fn load_config(&self, start_dir: &Path) -> Result<Option<LoadedConfig>> {
        if self.args.no_config {
            return Ok(None);
        }
        let path = match &self.args.file {
            Some(file) => file.clone(),
            None => find_config_file_from(start_dir)?,
        };
        load_config(&path).map(Some)
    }

    fn context(&self, working_dir: PathBuf, interpreter: Option<&Vec<String>>) -> Context {
        let ctx = Context::new(working_dir).with_dry_run(self.args.dry_run);
        match interpreter {
            Some(interpreter) => ctx.with_interpreter(interpreter.clone()),
            None => ctx,
        }
    }

    /// Host environment plus project tool directories under `project_dir`
    fn base_env(&self, project_dir: &Path) -> Result<EnvMap> {
        let mut env = self.host.vars.clone();
        if !self.args.no_project {
            prepend_path(
                &mut env,
                &[
                    project_dir.join(".venv").join("bin"),
                    project_dir.join("node_modules").join(".bin"),
                ],
            )?;
        }
        Ok(env)
    }

    fn run_tasks(
        &self,
        root: &Task,
        tasks: &Tasks,
        loaded: &LoadedConfig,
        working_dir: &Path,
    ) -> Result<Outcome> {
        let resolved = Resolver::new(tasks)
            .with_lifecycle(self.args.pre, self.args.post)
            .resolve(root)?;
        let ctx = self.context(working_dir.to_path_buf(), loaded.config.interpreter.as_ref());
        let env = self.base_env(loaded.base_dir())?;
        Ok(run(&resolved, &env, &ctx)?)
    }

    fn run_workspaces(&self, root_config: &LoadedConfig, root: &Task) -> Result<Outcome> {
        let base_dir = root_config.base_dir();
        let members = expand_workspaces(base_dir, &root_config.config.workspaces)?;
        let selected = filter_workspaces(base_dir, &members, &self.args.workspace)?;
        debug!(members = members.len(), selected = selected.len(), "workspaces");

        let mut outcome = Outcome::default();
        for member in selected {
            let ctx = self.context(member.clone(), root_config.config.interpreter.as_ref());
            ctx.print_workspace(&member);

            outcome = match find_config_in(&member) {
                Some(path) => {
                    let mut loaded = load_config(&path)?;
                    if loaded.config.interpreter.is_none() {
                        loaded.config.interpreter = root_config.config.interpreter.clone();
                    }
                    self.run_tasks(root, &loaded.tasks, &loaded, &member)?
                }
                None => {
                    let resolved = Resolver::new(&Tasks::new()).resolve(root)?;
                    run(&resolved, &self.base_env(&member)?, &ctx)?
                }
            };

            if !outcome.is_success() {
                break;
            }
        }

        Ok(outcome)
    }

    fn sync_git_hooks(&self, start_dir: &Path, tasks: &Tasks) -> Result<()> {
        let ctx = self.context(start_dir.to_path_buf(), None);
        let git_dir = git::find_git_dir(start_dir)
            .ok_or_else(|| DsError::GitDirNotFound(start_dir.to_path_buf()))?;
        let hooks_dir = git_dir.join("hooks");
        fs::create_dir_all(&hooks_dir)?;

        if git::validate(&hooks_dir, tasks, &self.host)? {
            ctx.print_info("Git hooks are up to date");
            return Ok(());
        }

        let diff = git::diff(&hooks_dir, tasks, &self.host)?;
        report_hook_diff(&ctx, &diff);

        if self.args.dry_run {
            ctx.print_dry_run("install git hooks", &hooks_dir);
            return Ok(());
        }

        git::force_install(&hooks_dir, tasks, &self.host)?;
        ctx.print_info(&format!(
            "Installed {} git hook(s) in {}",
            git::derive(tasks, &self.host).len(),
            hooks_dir.display()
        ));
        Ok(())
    }
}

fn report_hook_diff(ctx: &Context, diff: &HookDiff) {
    for hook in &diff.missing {
        ctx.print_info(&format!("Missing git hook: {}", hook));
    }
    for hook in &diff.changed {
        ctx.print_info(&format!("Outdated git hook: {}", hook));
    }
    for hook in &diff.unexpected {
        ctx.print_info(&format!("Removing git hook: {}", hook));
    }
}

/// Print the registry in declaration order
fn print_task_list(tasks: &Tasks) {
    if tasks.is_empty() {
        println!("No tasks defined.");
        return;
    }

    let width = tasks.names().map(str::len).max().unwrap_or(0);
    println!("{}", "Available tasks:".bold());
    for (name, task) in tasks.iter() {
        let padded = format!("{:<width$}", name, width = width);
        println!("  {}  {}", padded.cyan(), task.summary());
    }
}
