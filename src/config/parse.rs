//! Configuration file parsing and discovery

use crate::config::schema::validate_config;
use crate::config::types::{Config, TaskDef};
use crate::error::{ConfigError, ConfigResult, Result};
use crate::runner::{parse_reference, Task, Tasks};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["ds.yml", "ds.yaml"];

/// Find a configuration file in `dir` itself
pub fn find_config_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|file_name| dir.join(file_name))
        .find(|path| path.is_file())
}

/// Find the configuration file by searching `start_dir` and its parents
pub fn find_config_file_from(start_dir: &Path) -> ConfigResult<PathBuf> {
    let mut searched_paths = Vec::new();

    for dir in start_dir.ancestors() {
        if let Some(path) = find_config_in(dir) {
            return Ok(path);
        }
        searched_paths.extend(
            CONFIG_FILE_NAMES
                .iter()
                .map(|file_name| dir.join(file_name).display().to_string()),
        );
    }

    // Reached root without finding config
    Err(ConfigError::NotFound(searched_paths.join(", ")))
}

/// Parse a configuration file from a path
pub fn parse_config_file(path: &Path) -> Result<Config> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_config(&contents)
}

/// Parse configuration from a string
pub fn parse_config(yaml: &str) -> Result<Config> {
    // An empty file is an empty configuration
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

/// Build the task registry; relative paths are resolved against `base_dir`
pub fn build_tasks(config: &Config, base_dir: &Path) -> Tasks {
    config
        .tasks
        .iter()
        .map(|(name, def)| (name.clone(), build_task(def, base_dir)))
        .collect()
}

fn build_task(def: &TaskDef, base_dir: &Path) -> Task {
    match def {
        TaskDef::Command(cmd) => Task::command(cmd.as_str()),
        TaskDef::Composite(refs) => {
            Task::composite(refs.iter().map(|r| parse_reference(r)).collect())
        }
        TaskDef::Detailed(detail) => Task {
            help: detail.help.clone(),
            cmd: detail.cmd.clone().unwrap_or_default(),
            depends: detail.composite.iter().map(|r| parse_reference(r)).collect(),
            cwd: detail.cwd.as_ref().map(|dir| base_dir.join(dir)),
            env: detail.env.clone(),
            env_file: detail.env_file.as_ref().map(|file| base_dir.join(file)),
            parallel: detail.parallel,
            ..Task::default()
        },
    }
}

/// A parsed, validated configuration file
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub path: PathBuf,
    pub config: Config,
    pub tasks: Tasks,
}

impl LoadedConfig {
    /// Directory containing the configuration file
    pub fn base_dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Load, validate and build the registry for the config file at `path`
pub fn load_config(path: &Path) -> Result<LoadedConfig> {
    debug!(path = %path.display(), "loading config");
    let config = parse_config_file(path)?;
    validate_config(&config)?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let tasks = build_tasks(&config, base_dir);
    debug!(tasks = tasks.len(), "config loaded");

    Ok(LoadedConfig {
        path: path.to_path_buf(),
        config,
        tasks,
    })
}
