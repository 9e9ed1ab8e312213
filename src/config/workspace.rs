//! Workspace discovery
//!
//! A configuration may list member directories with glob patterns. Patterns
//! starting with `!` remove directories matched by earlier patterns.

use crate::error::{ConfigError, ConfigResult};
use globset::{Glob, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Expand workspace patterns relative to `base_dir` into sorted member directories
pub fn expand_workspaces(base_dir: &Path, patterns: &[String]) -> ConfigResult<Vec<PathBuf>> {
    let mut members = BTreeSet::new();

    for pattern in patterns {
        match pattern.strip_prefix('!') {
            Some(excluded) => {
                for dir in glob_dirs(base_dir, excluded)? {
                    members.remove(&dir);
                }
            }
            None => members.extend(glob_dirs(base_dir, pattern)?),
        }
    }

    debug!(count = members.len(), "expanded workspaces");
    Ok(members.into_iter().collect())
}

fn glob_dirs(base_dir: &Path, pattern: &str) -> ConfigResult<Vec<PathBuf>> {
    let invalid = |error: String| ConfigError::InvalidPattern {
        pattern: pattern.to_string(),
        error,
    };

    let full = base_dir.join(pattern);
    let full = full
        .to_str()
        .ok_or_else(|| invalid("path is not valid unicode".to_string()))?;

    let paths = glob::glob(full).map_err(|e| invalid(e.to_string()))?;
    // Unreadable entries are skipped
    Ok(paths
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_dir())
        .collect())
}

/// Keep the members whose path relative to `base_dir` matches any of `filters`
///
/// The filter `*` matches every member.
pub fn filter_workspaces(
    base_dir: &Path,
    members: &[PathBuf],
    filters: &[String],
) -> ConfigResult<Vec<PathBuf>> {
    let mut builder = GlobSetBuilder::new();
    for filter in filters {
        let glob = Glob::new(filter).map_err(|e| ConfigError::InvalidPattern {
            pattern: filter.clone(),
            error: e.to_string(),
        })?;
        builder.add(glob);
    }
    let set = builder.build().map_err(|e| ConfigError::InvalidPattern {
        pattern: filters.join(", "),
        error: e.to_string(),
    })?;

    Ok(members
        .iter()
        .filter(|member| {
            let relative = member.strip_prefix(base_dir).unwrap_or(member);
            set.is_match(relative)
        })
        .cloned()
        .collect())
}
