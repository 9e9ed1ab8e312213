//! Execution context for task running
//!
//! The context holds what stays fixed for a whole run: where it starts, how
//! commands are spawned, and how progress is reported.

use crate::runner::{ProcessRunner, ShellRunner};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// Execution context shared by every task in a run
pub struct Context {
    /// Working directory of the root task
    pub working_dir: PathBuf,

    /// Print commands instead of running them
    pub dry_run: bool,

    runner: Box<dyn ProcessRunner>,
}

impl Context {
    /// Create a context rooted at `working_dir` that runs commands with `sh -c`
    pub fn new(working_dir: PathBuf) -> Self {
        Context {
            working_dir,
            dry_run: false,
            runner: Box::new(ShellRunner::default()),
        }
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run commands through a different interpreter (e.g. `["bash", "-c"]`)
    pub fn with_interpreter(self, interpreter: Vec<String>) -> Self {
        self.with_runner(ShellRunner::new(interpreter))
    }

    /// Replace the process runner
    pub fn with_runner(mut self, runner: impl ProcessRunner + 'static) -> Self {
        self.runner = Box::new(runner);
        self
    }

    pub fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        eprintln!("{} {}", "[INFO]".cyan(), message);
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("{} {}", "[ERROR]".red().bold(), message);
    }

    /// Print a command that is about to run
    pub fn print_command(&self, line: &str, dir: &Path) {
        if dir == self.working_dir {
            eprintln!("{} {}", "[RUN]".green().bold(), line);
        } else {
            eprintln!(
                "{} {} {}",
                "[RUN]".green().bold(),
                line,
                format!("(in {})", dir.display()).dimmed()
            );
        }
    }

    /// Print a command that would run
    pub fn print_dry_run(&self, line: &str, dir: &Path) {
        eprintln!(
            "{} {} {}",
            "[DRY-RUN]".yellow().bold(),
            line,
            format!("(in {})", dir.display()).dimmed()
        );
    }

    /// Print the workspace about to be processed
    pub fn print_workspace(&self, dir: &Path) {
        eprintln!("{} {}", "[WORKSPACE]".magenta().bold(), dir.display());
    }
}
