//! Core configuration types
//!
//! This module defines the data structures that represent a ds.yml configuration file.

use crate::runner::EnvMap;
use serde::Deserialize;
use serde_yaml::Value;

/// Top-level configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Interpreter to run commands with (e.g., ["bash", "-c"])
    #[serde(default)]
    pub interpreter: Option<Vec<String>>,

    /// Workspace member patterns, relative to the config file
    #[serde(default)]
    pub workspaces: Vec<String>,

    /// Tasks in declaration order
    #[serde(default, deserialize_with = "deserialize_task_defs")]
    pub tasks: Vec<(String, TaskDef)>,
}

impl Config {
    pub fn task(&self, name: &str) -> Option<&TaskDef> {
        self.tasks
            .iter()
            .find(|(task_name, _)| task_name == name)
            .map(|(_, def)| def)
    }
}

/// A task definition
#[derive(Debug, Clone, PartialEq)]
pub enum TaskDef {
    /// `name: shell command`
    Command(String),

    /// `name: [ref, +ref, ...]`
    Composite(Vec<String>),

    /// Full mapping form
    Detailed(TaskDetail),
}

impl TaskDef {
    /// References to other tasks, as written
    pub fn references(&self) -> &[String] {
        match self {
            TaskDef::Command(_) => &[],
            TaskDef::Composite(refs) => refs,
            TaskDef::Detailed(detail) => &detail.composite,
        }
    }
}

/// Detailed task specification
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDetail {
    /// Description for `--list`
    #[serde(default)]
    pub help: Option<String>,

    /// Command to run after the composite tasks
    #[serde(default)]
    pub cmd: Option<String>,

    /// Tasks to run first
    #[serde(default, alias = "depends")]
    pub composite: Vec<String>,

    /// Working directory, relative to the config file
    #[serde(default)]
    pub cwd: Option<String>,

    /// Environment variables to set
    #[serde(default, deserialize_with = "deserialize_env")]
    pub env: EnvMap,

    /// File of `KEY=VALUE` lines, relative to the config file
    #[serde(rename = "env-file", default)]
    pub env_file: Option<String>,

    /// Run the composite tasks concurrently
    #[serde(default)]
    pub parallel: bool,
}

/// Custom deserializer for the task table that keeps declaration order and
/// accepts a string, a list or a mapping for each task
fn deserialize_task_defs<'de, D>(deserializer: D) -> Result<Vec<(String, TaskDef)>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;

    let mapping = match value {
        Value::Mapping(mapping) => mapping,
        // Null or not present
        Value::Null => return Ok(Vec::new()),
        _ => return Err(D::Error::custom("tasks must be a mapping")),
    };

    let mut tasks = Vec::new();
    for (key, value) in mapping {
        let name = scalar_to_string(&key)
            .ok_or_else(|| D::Error::custom("task names must be strings"))?;

        let def = match value {
            // Single command
            Value::String(cmd) => TaskDef::Command(cmd),
            // List of references
            Value::Sequence(seq) => {
                let mut refs = Vec::new();
                for item in seq {
                    match item {
                        Value::String(reference) => refs.push(reference),
                        _ => {
                            return Err(D::Error::custom(format!(
                                "task '{}': composite entries must be strings",
                                name
                            )))
                        }
                    }
                }
                TaskDef::Composite(refs)
            }
            // Full form
            Value::Mapping(_) => {
                let detail = TaskDetail::deserialize(value)
                    .map_err(|e| D::Error::custom(format!("task '{}': {}", name, e)))?;
                TaskDef::Detailed(detail)
            }
            _ => {
                return Err(D::Error::custom(format!(
                    "task '{}' must be a string, list, or mapping",
                    name
                )))
            }
        };

        tasks.push((name, def));
    }

    Ok(tasks)
}

/// Custom deserializer for environment maps that converts scalar values to strings
fn deserialize_env<'de, D>(deserializer: D) -> Result<EnvMap, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Mapping(mapping) => mapping
            .into_iter()
            .map(|(key, value)| {
                let key = scalar_to_string(&key)
                    .ok_or_else(|| D::Error::custom("env names must be strings"))?;
                let value = scalar_to_string(&value).ok_or_else(|| {
                    D::Error::custom(format!("env value for '{}' must be a scalar", key))
                })?;
                Ok((key, value))
            })
            .collect(),
        // Null or not present
        Value::Null => Ok(EnvMap::new()),
        _ => Err(D::Error::custom("env must be a mapping")),
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_simple_config() {
        let yaml = r#"
tasks:
  hello: echo "hello"
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.tasks.len(), 1);
        assert_eq!(
            config.task("hello"),
            Some(&TaskDef::Command("echo \"hello\"".to_string()))
        );
    }

    #[test]
    fn test_tasks_keep_declaration_order() {
        let yaml = r#"
tasks:
  zeta: echo z
  alpha: echo a
  mid: [alpha, zeta]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let names: Vec<&str> = config.tasks.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
        assert_eq!(
            config.task("mid").unwrap().references(),
            &["alpha".to_string(), "zeta".to_string()]
        );
    }

    #[test]
    fn test_deserialize_detailed_task() {
        let yaml = r#"
tasks:
  ci:
    help: Run CI
    depends: [+lint, test]
    cmd: echo done
    parallel: true
    cwd: sub
    env:
      RUST_LOG: debug
      PORT: 8080
      VERBOSE: true
    env-file: .env
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let TaskDef::Detailed(detail) = config.task("ci").unwrap() else {
            panic!("expected a detailed task");
        };

        assert_eq!(detail.help.as_deref(), Some("Run CI"));
        assert_eq!(detail.composite, vec!["+lint", "test"]);
        assert_eq!(detail.cmd.as_deref(), Some("echo done"));
        assert!(detail.parallel);
        assert_eq!(detail.cwd.as_deref(), Some("sub"));
        assert_eq!(detail.env.get("PORT").map(String::as_str), Some("8080"));
        assert_eq!(detail.env.get("VERBOSE").map(String::as_str), Some("true"));
        assert_eq!(detail.env_file.as_deref(), Some(".env"));
    }

    #[test]
    fn test_unknown_task_key_is_rejected() {
        let yaml = r#"
tasks:
  build:
    command: cargo build
"#;
        let err = serde_yaml::from_str::<Config>(yaml).unwrap_err();
        assert!(err.to_string().contains("task 'build'"));
    }

    #[test]
    fn test_null_task_is_rejected() {
        let yaml = "tasks:\n  empty:\n";
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_deserialize_interpreter_and_workspaces() {
        let yaml = r#"
interpreter: [bash, -c]
workspaces: ["packages/*", "!packages/legacy"]
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            config.interpreter,
            Some(vec!["bash".to_string(), "-c".to_string()])
        );
        assert_eq!(config.workspaces.len(), 2);
        assert!(config.tasks.is_empty());
    }
}
