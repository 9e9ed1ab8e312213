//! Configuration validation
//!
//! This module provides validation logic for configuration files.

use crate::config::types::{Config, TaskDef};
use crate::error::{ConfigError, ConfigResult};
use crate::runner::parse_reference;
use std::collections::HashSet;

/// Validate a complete configuration
pub fn validate_config(config: &Config) -> ConfigResult<()> {
    if let Some(interpreter) = &config.interpreter {
        if interpreter.is_empty() {
            return Err(ConfigError::Invalid(
                "interpreter must name a program".to_string(),
            ));
        }
    }

    for pattern in &config.workspaces {
        validate_workspace_pattern(pattern)?;
    }

    // Validate each task
    for (name, def) in &config.tasks {
        validate_task(name, def)?;
    }

    // Check for circular references between tasks
    detect_circular_task_dependencies(config)?;

    Ok(())
}

/// Validate a single task
pub fn validate_task(name: &str, def: &TaskDef) -> ConfigResult<()> {
    match def {
        TaskDef::Command(cmd) if cmd.trim().is_empty() => Err(ConfigError::Invalid(format!(
            "task '{}' has an empty command",
            name
        ))),
        TaskDef::Composite(refs) if refs.is_empty() => Err(ConfigError::Invalid(format!(
            "task '{}' does not reference any tasks",
            name
        ))),
        TaskDef::Detailed(detail) => {
            let has_cmd = detail.cmd.as_deref().is_some_and(|cmd| !cmd.trim().is_empty());
            if !has_cmd && detail.composite.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "task '{}' needs a 'cmd' or a 'composite'",
                    name
                )));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Validate a workspace glob (a leading `!` marks an exclusion)
fn validate_workspace_pattern(pattern: &str) -> ConfigResult<()> {
    let glob = pattern.strip_prefix('!').unwrap_or(pattern);
    glob::Pattern::new(glob).map_err(|e| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        error: e.to_string(),
    })?;
    Ok(())
}

/// Detect circular references between composite tasks
fn detect_circular_task_dependencies(config: &Config) -> ConfigResult<()> {
    let mut visited = HashSet::new();
    for (task_name, _) in &config.tasks {
        let mut stack = Vec::new();
        check_task_cycle(config, task_name, &mut visited, &mut stack)?;
    }
    Ok(())
}

/// Recursively check for cycles in task references
fn check_task_cycle(
    config: &Config,
    task_name: &str,
    visited: &mut HashSet<String>,
    stack: &mut Vec<String>,
) -> ConfigResult<()> {
    // Check if we've found a cycle
    if stack.iter().any(|name| name == task_name) {
        stack.push(task_name.to_string());
        return Err(ConfigError::CircularDependency(stack.join(" -> ")));
    }

    // Skip if already fully processed
    if visited.contains(task_name) {
        return Ok(());
    }

    // References that are not task names run as shell commands
    let Some(def) = config.task(task_name) else {
        return Ok(());
    };

    stack.push(task_name.to_string());

    for reference in def.references() {
        let target = parse_reference(reference).cmd;
        check_task_cycle(config, &target, visited, stack)?;
    }

    // Remove from stack and mark as visited
    stack.pop();
    visited.insert(task_name.to_string());

    Ok(())
}
