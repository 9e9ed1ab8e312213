//! Command execution
//!
//! This module handles spawning shell commands.

use crate::runner::{command_line, EnvMap};
use std::io;
use std::path::Path;
use std::process::{Command as StdCommand, Stdio};
use std::sync::Arc;

/// Everything needed to start one command
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub cmd: &'a str,
    pub args: &'a [String],
    pub cwd: &'a Path,
    pub env: &'a EnvMap,
}

impl Invocation<'_> {
    /// The shell command line this invocation runs
    pub fn command_line(&self) -> String {
        command_line(self.cmd, self.args)
    }
}

/// Starts a command and waits for its exit code
pub trait ProcessRunner: Send + Sync {
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<i32>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for Arc<T> {
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<i32> {
        (**self).run(invocation)
    }
}

/// Runs command lines through a shell interpreter (`sh -c` by default)
#[derive(Debug, Clone)]
pub struct ShellRunner {
    interpreter: Vec<String>,
}

impl ShellRunner {
    pub fn new(interpreter: Vec<String>) -> Self {
        ShellRunner { interpreter }
    }

    pub fn interpreter(&self) -> &[String] {
        &self.interpreter
    }
}

impl Default for ShellRunner {
    fn default() -> Self {
        ShellRunner::new(vec!["sh".to_string(), "-c".to_string()])
    }
}

impl ProcessRunner for ShellRunner {
    fn run(&self, invocation: &Invocation<'_>) -> io::Result<i32> {
        let (program, flags) = self
            .interpreter
            .split_first()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "interpreter is empty"))?;

        let mut command = StdCommand::new(program);
        command.args(flags);
        command.arg(invocation.command_line());
        command.current_dir(invocation.cwd);

        // The invocation carries the complete environment.
        command.env_clear();
        command.envs(invocation.env);

        command.stdin(Stdio::inherit());
        command.stdout(Stdio::inherit());
        command.stderr(Stdio::inherit());

        let status = command.status()?;
        // Killed by a signal
        Ok(status.code().unwrap_or(1))
    }
}
