//! CLI interface and argument parsing
//!
//! This module handles command-line parsing, help generation, and the
//! top-level application flow.

pub mod app;
pub mod args;

// Re-export main types
pub use app::*;
pub use args::*;

use crate::error::Result;
use crate::runner::HostEnv;

/// Run the CLI application with the process arguments, returning the exit code
pub fn run() -> Result<i32> {
    let args = Args::parse();
    init_logging(args.debug);

    let host = HostEnv::capture()?;
    App::new(args, host).run()
}

/// Install the stderr log subscriber; `RUST_LOG` overrides the default level
fn init_logging(debug: bool) {
    let fallback = if debug { "ds=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));

    // A subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
