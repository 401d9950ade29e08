//! Workspace path helpers
//!
//! Repository paths are always resolved below the workspace, and required
//! directories are created on demand.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use crate::error::ExecutionError;

/// Resolves a repository path below `workspace`
///
/// Root and prefix components are dropped, so an absolute repository path
/// still lands inside the workspace. `.` components are skipped and `..`
/// never climbs above the workspace itself.
pub fn resolve(workspace: &Path, repo_path: &str) -> PathBuf {
    let mut parts: Vec<&OsStr> = Vec::new();
    for component in Path::new(repo_path).components() {
        match component {
            Component::Normal(part) => parts.push(part),
            Component::ParentDir => {
                parts.pop();
            }
            Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
        }
    }

    let mut resolved = workspace.to_path_buf();
    resolved.extend(parts);
    resolved
}

/// Ensures `path` is a directory, creating it (and its parents) if absent
///
/// Fails with [`ExecutionError::PathConflict`] when a non-directory already
/// occupies the path.
pub fn ensure_dir(path: &Path) -> Result<(), ExecutionError> {
    if path.exists() && !path.is_dir() {
        return Err(ExecutionError::PathConflict {
            path: path.to_path_buf(),
        });
    }

    std::fs::create_dir_all(path).map_err(|source| ExecutionError::Io {
        path: path.to_path_buf(),
        source,
    })
}
