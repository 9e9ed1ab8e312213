//! Integration tests for git hook synchronization

mod common;

use ds::git::{
    derive, detect_installed, diff, force_install, hook_script, validate, GIT_HOOK_PREFIX,
};
use ds::runner::{HostEnv, Task, Tasks};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn host() -> HostEnv {
    let mut host = HostEnv {
        program: "ds".to_string(),
        ..HostEnv::default()
    };
    host.vars.insert("PATH".to_string(), "test".to_string());
    host
}

fn tasks(hooks: &[&str]) -> Tasks {
    let hook_tasks = hooks.iter().map(|hook| {
        (
            format!("{}{}", GIT_HOOK_PREFIX, hook),
            Task::command("echo it worked"),
        )
    });
    std::iter::once(("ls".to_string(), Task::command("ls -la")))
        .chain(hook_tasks)
        .collect()
}

/// A hooks directory with a sample file, a directory named like a hook, an
/// outdated `pre-commit` and an up to date `pre-rebase`
fn create_hook_dir(root: &Path) -> std::path::PathBuf {
    let hooks_dir = root.join("hooks");
    fs::create_dir(&hooks_dir).unwrap();

    fs::write(hooks_dir.join("pre-commit.sample"), "#!/bin/bash\n# invalid").unwrap();
    fs::create_dir(hooks_dir.join("commit-msg")).unwrap();
    fs::write(hooks_dir.join("pre-commit"), "#!/bin/bash\n# valid").unwrap();
    fs::write(hooks_dir.join("pre-rebase"), hook_script("pre-rebase", &host())).unwrap();

    hooks_dir
}

#[test]
fn test_installed_hook_detection() {
    let temp_dir = TempDir::new().unwrap();
    let hooks_dir = temp_dir.path().join("hooks");
    fs::create_dir(&hooks_dir).unwrap();
    fs::write(hooks_dir.join("pre-commit.sample"), "#!/bin/bash\n# invalid").unwrap();
    fs::create_dir(hooks_dir.join("commit-msg")).unwrap();
    fs::write(hooks_dir.join("pre-push"), "#!/bin/bash\n# valid").unwrap();

    assert_eq!(detect_installed(&hooks_dir).unwrap(), vec!["pre-push"]);
}

#[test]
fn test_create_hook_list() {
    let hooks = derive(&tasks(&["pre-commit"]), &host());

    assert_eq!(hooks.len(), 1);
    assert_eq!(hooks[0].0, "pre-commit");
    assert_eq!(hooks[0].1, hook_script("pre-commit", &host()));
}

#[test]
fn test_no_hook_tasks_always_validates() {
    let temp_dir = TempDir::new().unwrap();
    let hooks_dir = create_hook_dir(temp_dir.path());

    assert!(validate(&hooks_dir, &tasks(&[]), &host()).unwrap());
}

#[test]
fn test_wrong_number_of_hooks() {
    let temp_dir = TempDir::new().unwrap();
    let hooks_dir = create_hook_dir(temp_dir.path());
    let registry = tasks(&["pre-commit"]);

    assert!(!validate(&hooks_dir, &registry, &host()).unwrap());
    let result = diff(&hooks_dir, &registry, &host()).unwrap();
    assert_eq!(result.unexpected, vec!["pre-rebase"]);
    assert_eq!(result.changed, vec!["pre-commit"]);
}

#[test]
fn test_wrong_hook_names() {
    let temp_dir = TempDir::new().unwrap();
    let hooks_dir = create_hook_dir(temp_dir.path());
    let registry = tasks(&["pre-commit", "post-update"]);

    assert!(!validate(&hooks_dir, &registry, &host()).unwrap());
    let result = diff(&hooks_dir, &registry, &host()).unwrap();
    assert_eq!(result.missing, vec!["post-update"]);
    assert_eq!(result.unexpected, vec!["pre-rebase"]);
}

#[test]
fn test_wrong_hook_bodies() {
    let temp_dir = TempDir::new().unwrap();
    let hooks_dir = create_hook_dir(temp_dir.path());
    let registry = tasks(&["pre-commit", "pre-rebase"]);

    assert!(!validate(&hooks_dir, &registry, &host()).unwrap());
    let result = diff(&hooks_dir, &registry, &host()).unwrap();
    assert!(result.missing.is_empty());
    assert!(result.unexpected.is_empty());
    assert_eq!(result.changed, vec!["pre-commit"]);
}

#[test]
fn test_all_hooks_match() {
    let temp_dir = TempDir::new().unwrap();
    let hooks_dir = create_hook_dir(temp_dir.path());
    fs::write(hooks_dir.join("pre-commit"), hook_script("pre-commit", &host())).unwrap();

    let registry = tasks(&["pre-commit", "pre-rebase"]);
    assert!(validate(&hooks_dir, &registry, &host()).unwrap());
    assert!(diff(&hooks_dir, &registry, &host()).unwrap().is_empty());
}

#[test]
fn test_force_install_converges() {
    let temp_dir = TempDir::new().unwrap();
    let hooks_dir = create_hook_dir(temp_dir.path());
    let registry = tasks(&["pre-commit", "post-update"]);

    assert!(!validate(&hooks_dir, &registry, &host()).unwrap());
    force_install(&hooks_dir, &registry, &host()).unwrap();
    assert!(validate(&hooks_dir, &registry, &host()).unwrap());

    // Leftovers that are not hooks are untouched
    assert!(hooks_dir.join("pre-commit.sample").exists());
    assert!(hooks_dir.join("commit-msg").is_dir());
    assert!(!hooks_dir.join("pre-rebase").exists());

    // Installing again changes nothing
    force_install(&hooks_dir, &registry, &host()).unwrap();
    assert!(validate(&hooks_dir, &registry, &host()).unwrap());
}

#[cfg(unix)]
#[test]
fn test_installed_hooks_are_executable() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let hooks_dir = temp_dir.path().join("hooks");
    fs::create_dir(&hooks_dir).unwrap();

    force_install(&hooks_dir, &tasks(&["pre-push"]), &host()).unwrap();
    let mode = fs::metadata(hooks_dir.join("pre-push")).unwrap().permissions().mode();
    assert_eq!(mode & 0o111, 0o111);
}
