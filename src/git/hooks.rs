//! Git hook synchronization
//!
//! The hooks that should exist are derived from the task registry; each one is a
//! small script that re-runs `ds git-hook-<hook>`. Installed hooks are compared
//! with the derived scripts byte for byte.

use crate::runner::{HostEnv, Tasks};
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Task name prefix marking a git hook
pub const GIT_HOOK_PREFIX: &str = "git-hook-";

/// Hook names git recognizes
pub const VALID_GIT_HOOKS: &[&str] = &[
    "applypatch-msg",
    "commit-msg",
    "fsmonitor-watchman",
    "post-update",
    "pre-applypatch",
    "pre-commit",
    "pre-merge-commit",
    "pre-push",
    "pre-rebase",
    "pre-receive",
    "prepare-commit-msg",
    "push-to-checkout",
    "update",
];

pub fn is_valid_hook(name: &str) -> bool {
    VALID_GIT_HOOKS.contains(&name)
}

/// Script installed for `hook`
pub fn hook_script(hook: &str, host: &HostEnv) -> String {
    format!(
        "#! /bin/bash\n\nPATH=\"{}\" {} {}{}",
        host.path(),
        host.program,
        GIT_HOOK_PREFIX,
        hook
    )
}

/// `(hook, script)` pairs for every hook task in the registry, in registry order
pub fn derive(tasks: &Tasks, host: &HostEnv) -> Vec<(String, String)> {
    tasks
        .names()
        .filter_map(|name| name.strip_prefix(GIT_HOOK_PREFIX))
        .filter(|hook| is_valid_hook(hook))
        .map(|hook| (hook.to_string(), hook_script(hook, host)))
        .collect()
}

/// Sorted names of the hooks installed in `hooks_dir`
///
/// Only regular files with a valid hook name count, so `*.sample` files and
/// directories are ignored.
pub fn detect_installed(hooks_dir: &Path) -> io::Result<Vec<String>> {
    let mut installed = Vec::new();
    for entry in fs::read_dir(hooks_dir)? {
        let entry = entry?;
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_valid_hook(&name) && entry.path().is_file() {
            installed.push(name);
        }
    }
    installed.sort();
    Ok(installed)
}

/// Difference between installed and derived hooks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HookDiff {
    /// Derived but not installed
    pub missing: Vec<String>,
    /// Installed but not derived
    pub unexpected: Vec<String>,
    /// Installed with different contents
    pub changed: Vec<String>,
}

impl HookDiff {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.unexpected.is_empty() && self.changed.is_empty()
    }
}

/// Compare the hooks in `hooks_dir` with those derived from `tasks`
pub fn diff(hooks_dir: &Path, tasks: &Tasks, host: &HostEnv) -> io::Result<HookDiff> {
    let installed = detect_installed(hooks_dir)?;
    let mut derived = derive(tasks, host);
    derived.sort_by(|a, b| a.0.cmp(&b.0));

    let mut result = HookDiff::default();
    for (hook, script) in &derived {
        if !installed.contains(hook) {
            result.missing.push(hook.clone());
        } else if fs::read(hooks_dir.join(hook))? != script.as_bytes() {
            result.changed.push(hook.clone());
        }
    }
    result.unexpected = installed
        .into_iter()
        .filter(|hook| !derived.iter().any(|(name, _)| name == hook))
        .collect();

    Ok(result)
}

/// Whether the installed hooks match the registry exactly
///
/// A registry without hook tasks always validates.
pub fn validate(hooks_dir: &Path, tasks: &Tasks, host: &HostEnv) -> io::Result<bool> {
    if derive(tasks, host).is_empty() {
        return Ok(true);
    }
    Ok(diff(hooks_dir, tasks, host)?.is_empty())
}

/// Replace every installed hook with the derived set
pub fn force_install(hooks_dir: &Path, tasks: &Tasks, host: &HostEnv) -> io::Result<()> {
    for hook in detect_installed(hooks_dir)? {
        debug!(hook = %hook, "removing installed hook");
        fs::remove_file(hooks_dir.join(&hook))?;
    }

    for (hook, script) in derive(tasks, host) {
        let path = hooks_dir.join(&hook);
        debug!(path = %path.display(), "writing hook");
        fs::write(&path, script)?;
        make_executable(&path)?;
    }

    Ok(())
}

#[cfg(unix)]
fn make_executable(path: &Path) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let mut permissions = fs::metadata(path)?.permissions();
    permissions.set_mode(permissions.mode() | 0o111);
    fs::set_permissions(path, permissions)
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> io::Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Task;

    fn host() -> HostEnv {
        let mut host = HostEnv {
            program: "/usr/local/bin/ds".to_string(),
            ..HostEnv::default()
        };
        host.vars.insert("PATH".to_string(), "test".to_string());
        host
    }

    #[test]
    fn test_hook_script() {
        assert_eq!(
            hook_script("pre-commit", &host()),
            "#! /bin/bash\n\nPATH=\"test\" /usr/local/bin/ds git-hook-pre-commit"
        );
    }

    #[test]
    fn test_derive_skips_unknown_hooks() {
        let tasks: Tasks = vec![
            ("ls", Task::command("ls -la")),
            ("git-hook-pre-push", Task::command("cargo test")),
            ("git-hook-not-a-hook", Task::command("true")),
            ("git-hook-pre-commit", Task::command("cargo fmt --check")),
        ]
        .into_iter()
        .collect();

        let hooks: Vec<String> = derive(&tasks, &host()).into_iter().map(|(h, _)| h).collect();
        assert_eq!(hooks, vec!["pre-push", "pre-commit"]);
    }

    #[test]
    fn test_every_valid_hook_is_recognized() {
        for hook in VALID_GIT_HOOKS {
            assert!(is_valid_hook(hook));
        }
        assert!(!is_valid_hook("pre-commit.sample"));
        assert_eq!(VALID_GIT_HOOKS.len(), 13);
    }
}
