//! Task tree execution
//!
//! Walks a resolved task tree. Dependencies run before a task's own command,
//! either in order (stopping at the first failure that is not suppressed) or all
//! at once (waiting for every sibling before reporting).

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::{load_env_file, Context, EnvMap, Invocation, Task};
use std::path::PathBuf;
use std::thread;
use tracing::debug;

/// Result of running one task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Status {
    #[default]
    Succeeded,
    /// Exit code of the command that failed
    Failed(i32),
}

impl Status {
    pub fn is_success(&self) -> bool {
        matches!(self, Status::Succeeded)
    }
}

/// A command that exited non-zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Label of the task whose command failed
    pub task: String,
    pub code: i32,
    /// The task was marked with `+`
    pub suppressed: bool,
}

/// Status of a task plus every failure seen beneath it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub status: Status,
    pub failures: Vec<Failure>,
}

impl Outcome {
    /// True when nothing failed, suppressed failures included
    pub fn is_success(&self) -> bool {
        self.status.is_success() && self.failures.is_empty()
    }

    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self.status {
            Status::Failed(code) => code,
            Status::Succeeded => self.failures.first().map_or(0, |failure| failure.code),
        }
    }
}

/// Working directory and environment a task runs in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    pub cwd: PathBuf,
    pub env: EnvMap,
}

impl Scope {
    pub fn new(cwd: PathBuf, env: EnvMap) -> Self {
        Scope { cwd, env }
    }

    /// Scope for `task`: its `cwd` relative to ours, then `env_file`, then `env`
    pub fn enter(&self, task: &Task) -> ExecutionResult<Scope> {
        let cwd = match &task.cwd {
            Some(dir) => self.cwd.join(dir),
            None => self.cwd.clone(),
        };

        let mut env = self.env.clone();
        if let Some(file) = &task.env_file {
            env.extend(load_env_file(&cwd.join(file))?);
        }
        env.extend(task.env.iter().map(|(k, v)| (k.clone(), v.clone())));

        Ok(Scope { cwd, env })
    }
}

/// Run `task` starting from `base_env` and the context's working directory
pub fn run(task: &Task, base_env: &EnvMap, ctx: &Context) -> ExecutionResult<Outcome> {
    let scope = Scope::new(ctx.working_dir.clone(), base_env.clone());
    execute(task, &scope, ctx)
}

/// Run `task` inside `parent`
pub fn execute(task: &Task, parent: &Scope, ctx: &Context) -> ExecutionResult<Outcome> {
    let scope = parent.enter(task)?;
    debug!(task = %task.label(), cwd = %scope.cwd.display(), "running task");

    let mut outcome = if task.parallel {
        run_parallel(&task.depends, &scope, ctx)?
    } else {
        run_sequential(&task.depends, &scope, ctx)?
    };

    if !outcome.status.is_success() || !task.has_command() {
        return Ok(outcome);
    }

    let code = spawn(task, &scope, ctx)?;
    if code != 0 {
        outcome.status = Status::Failed(code);
        outcome.failures.push(Failure {
            task: task.label(),
            code,
            suppressed: task.suppress_failure,
        });
    }
    Ok(outcome)
}

fn run_sequential(depends: &[Task], scope: &Scope, ctx: &Context) -> ExecutionResult<Outcome> {
    let mut outcome = Outcome::default();

    for dep in depends {
        let child = execute(dep, scope, ctx)?;
        let status = child.status;
        outcome.failures.extend(child.failures);

        if let Status::Failed(code) = status {
            if dep.suppress_failure {
                ctx.print_info(&format!(
                    "Ignoring failure of '{}' (exit code {})",
                    dep.label(),
                    code
                ));
            } else {
                outcome.status = Status::Failed(code);
                break;
            }
        }
    }

    Ok(outcome)
}

fn run_parallel(depends: &[Task], scope: &Scope, ctx: &Context) -> ExecutionResult<Outcome> {
    let results: Vec<ExecutionResult<Outcome>> = thread::scope(|s| {
        let handles: Vec<_> = depends
            .iter()
            .map(|dep| s.spawn(move || execute(dep, scope, ctx)))
            .collect();

        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let mut outcome = Outcome::default();
    for (dep, result) in depends.iter().zip(results) {
        let child = result?;
        outcome.failures.extend(child.failures);

        if let Status::Failed(code) = child.status {
            if dep.suppress_failure {
                ctx.print_info(&format!(
                    "Ignoring failure of '{}' (exit code {})",
                    dep.label(),
                    code
                ));
            } else if outcome.status.is_success() {
                outcome.status = Status::Failed(code);
            }
        }
    }

    Ok(outcome)
}

fn spawn(task: &Task, scope: &Scope, ctx: &Context) -> ExecutionResult<i32> {
    let invocation = Invocation {
        cmd: &task.cmd,
        args: &task.args,
        cwd: &scope.cwd,
        env: &scope.env,
    };
    let line = invocation.command_line();

    if ctx.dry_run {
        ctx.print_dry_run(&line, &scope.cwd);
        return Ok(0);
    }

    ctx.print_command(&line, &scope.cwd);
    let code = ctx
        .runner()
        .run(&invocation)
        .map_err(|e| ExecutionError::Spawn {
            command: line.clone(),
            error: e.to_string(),
        })?;

    if code != 0 {
        ctx.print_error(&format!(
            "Task '{}' failed with exit code {}: {}",
            task.label(),
            code,
            line
        ));
    }
    Ok(code)
}
