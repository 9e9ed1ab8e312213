//! Error types for ds

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for ds operations
pub type Result<T> = std::result::Result<T, DsError>;

/// Main error type for ds
#[derive(Error, Debug)]
pub enum DsError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Task execution errors
    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// No `.git` directory above the starting directory
    #[error("Not inside a git repository (searched from {})", .0.display())]
    GitDirNotFound(PathBuf),
}

/// Configuration parsing and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to find config file (searched: {0})")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Circular dependency detected: {0}")]
    CircularDependency(String),

    #[error("Invalid pattern '{pattern}': {error}")]
    InvalidPattern { pattern: String, error: String },
}

/// Task execution errors
///
/// A command exiting non-zero is not an error; it is recorded as a failure in the
/// run outcome. These variants cover problems that prevent a command from starting.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to spawn '{command}': {error}")]
    Spawn { command: String, error: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

/// Specialized result type for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Specialized result type for execution operations
pub type ExecutionResult<T> = std::result::Result<T, ExecutionError>;
