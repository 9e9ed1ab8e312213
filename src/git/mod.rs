//! Git integration
//!
//! Tasks named `git-hook-<hook>` can be installed as git hooks that call back
//! into ds.

pub mod hooks;

pub use hooks::*;

use std::path::{Path, PathBuf};

/// Find the `.git` directory of the repository containing `start`
///
/// A `.git` file (as used by worktrees and submodules) is not followed.
pub fn find_git_dir(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(".git"))
        .find(|candidate| candidate.is_dir())
}
