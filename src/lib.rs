//! ds - run dev scripts
//!
//! ds runs named, composable shell commands declared in a `ds.yml` file or given
//! on the command line. Tasks can take their own arguments, run in order or in
//! parallel, ignore failures, and be installed as git hooks.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod runner;

// Re-export commonly used types
pub use error::{DsError, Result};

/// Current version of ds
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
