//! Configuration parsing and validation
//!
//! This module handles parsing of ds.yml configuration files, validation of
//! their structure, and workspace discovery.

pub mod parse;
pub mod schema;
pub mod types;
pub mod workspace;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
pub use workspace::*;
