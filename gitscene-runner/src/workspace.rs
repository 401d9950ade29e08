//! Workspace allocation
//!
//! Every script run gets its own directory below the configured base,
//! named after the script and a random suffix. Workspaces are never removed
//! here; the caller decides when to clean up.

use gitscene_core::WorkspaceProvider;
use std::path::PathBuf;
use tracing::info;
use uuid::Uuid;

/// Allocates workspaces as `<base>/gitscene-<script>-<uuid>`
#[derive(Debug, Clone)]
pub struct TempWorkspaceProvider {
    base: PathBuf,
}

impl TempWorkspaceProvider {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &PathBuf {
        &self.base
    }
}

impl WorkspaceProvider for TempWorkspaceProvider {
    fn allocate(&self, script_id: &str) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(&self.base)?;

        let name = format!(
            "gitscene-{}-{}",
            sanitize(script_id),
            Uuid::new_v4().simple()
        );
        let workspace = self.base.join(name);
        // create_dir fails if it already exists, so the workspace is always fresh
        std::fs::create_dir(&workspace)?;

        info!("Allocated workspace {}", workspace.display());
        Ok(workspace)
    }
}

/// Keeps script ids usable as a single path component
fn sanitize(script_id: &str) -> String {
    let cleaned: String = script_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if cleaned.is_empty() {
        "script".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_fresh_directories() {
        let base = tempfile::tempdir().unwrap();
        let provider = TempWorkspaceProvider::new(base.path());

        let first = provider.allocate("demo").unwrap();
        let second = provider.allocate("demo").unwrap();

        assert_ne!(first, second);
        assert!(first.is_dir());
        assert!(second.is_dir());
        assert_eq!(std::fs::read_dir(&first).unwrap().count(), 0);
        assert!(first.starts_with(base.path()));
    }

    #[test]
    fn test_allocate_creates_missing_base() {
        let base = tempfile::tempdir().unwrap();
        let provider = TempWorkspaceProvider::new(base.path().join("nested").join("base"));

        let workspace = provider.allocate("demo").unwrap();
        assert!(workspace.is_dir());
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("example-git_command"), "example-git_command");
        assert_eq!(sanitize("../../etc"), "______etc");
        assert_eq!(sanitize(""), "script");
    }
}
