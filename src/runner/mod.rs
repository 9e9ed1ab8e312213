//! Task execution engine
//!
//! This module turns command-line tokens into a task tree, expands references
//! to configured tasks, and runs the result.

pub mod command;
pub mod context;
pub mod env;
pub mod execute;
pub mod interpolate;
pub mod resolve;
pub mod task;
pub mod tokens;

// Re-export main types
pub use command::*;
pub use context::*;
pub use env::*;
pub use execute::{execute, run, Failure, Outcome, Scope, Status};
pub use interpolate::*;
pub use resolve::*;
pub use task::*;
pub use tokens::*;
