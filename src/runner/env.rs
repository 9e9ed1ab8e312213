//! Host environment and environment files

use crate::error::{ExecutionError, ExecutionResult};
use crate::runner::EnvMap;
use std::env;
use std::io;
use std::path::{Path, PathBuf};

/// Snapshot of the process state the runner depends on
///
/// Captured once at startup and passed explicitly to everything that would
/// otherwise read process globals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostEnv {
    /// Environment variables (non-unicode entries are dropped)
    pub vars: EnvMap,

    /// Current working directory
    pub cwd: PathBuf,

    /// How this program was invoked (`argv[0]`)
    pub program: String,
}

impl HostEnv {
    /// Capture the current process state
    pub fn capture() -> io::Result<Self> {
        let vars = env::vars_os()
            .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
            .collect();

        Ok(HostEnv {
            vars,
            cwd: env::current_dir()?,
            program: env::args().next().unwrap_or_else(|| "ds".to_string()),
        })
    }

    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value of `PATH`, empty when unset
    pub fn path(&self) -> &str {
        self.var("PATH").unwrap_or_default()
    }
}

/// Read `KEY=VALUE` pairs from an env file, in file order
pub fn load_env_file(path: &Path) -> ExecutionResult<Vec<(String, String)>> {
    let describe = |e: dotenvy::Error| {
        ExecutionError::Environment(format!("failed to read '{}': {}", path.display(), e))
    };

    dotenvy::from_path_iter(path)
        .map_err(describe)?
        .map(|item| item.map_err(describe))
        .collect()
}

/// Prepend existing directories to `PATH` in `env`
pub fn prepend_path(env: &mut EnvMap, dirs: &[PathBuf]) -> ExecutionResult<()> {
    let existing: Vec<PathBuf> = dirs.iter().filter(|dir| dir.is_dir()).cloned().collect();
    if existing.is_empty() {
        return Ok(());
    }

    let current = env.get("PATH").cloned().unwrap_or_default();
    let inherited = env::split_paths(&current).filter(|dir| !dir.as_os_str().is_empty());
    let joined = env::join_paths(existing.into_iter().chain(inherited))
        .map_err(|e| ExecutionError::Environment(format!("invalid PATH entry: {}", e)))?;
    let joined = joined
        .into_string()
        .map_err(|_| ExecutionError::Environment("PATH is not valid unicode".to_string()))?;

    env.insert("PATH".to_string(), joined);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_env_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join(".env");
        fs::write(&path, "# comment\nFIRST=1\nSECOND=\"two words\"\n").unwrap();

        let pairs = load_env_file(&path).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("FIRST".to_string(), "1".to_string()),
                ("SECOND".to_string(), "two words".to_string()),
            ]
        );
    }

    #[test]
    fn test_load_missing_env_file() {
        let temp_dir = TempDir::new().unwrap();
        let result = load_env_file(&temp_dir.path().join("missing.env"));
        assert!(matches!(result, Err(ExecutionError::Environment(_))));
    }

    #[test]
    fn test_prepend_path_skips_missing_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let bin = temp_dir.path().join("bin");
        fs::create_dir(&bin).unwrap();

        let mut env = EnvMap::new();
        env.insert("PATH".to_string(), "/usr/bin".to_string());
        prepend_path(&mut env, &[temp_dir.path().join("missing"), bin.clone()]).unwrap();

        let path = env.get("PATH").unwrap();
        let parts: Vec<PathBuf> = env::split_paths(path).collect();
        assert_eq!(parts, vec![bin, PathBuf::from("/usr/bin")]);
    }

    #[test]
    fn test_host_env_path() {
        let mut host = HostEnv::default();
        assert_eq!(host.path(), "");
        host.vars.insert("PATH".to_string(), "/bin".to_string());
        assert_eq!(host.path(), "/bin");
    }
}
