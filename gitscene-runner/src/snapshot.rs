//! Git graph snapshots
//!
//! After every command, [`GitSnapshotHook`] dumps the commit graph of the
//! repository the command ran in as a Graphviz DOT document. The sequence of
//! snapshots shows how the history evolved step by step. Turning DOT into
//! pictures is left to external tools.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gitscene_core::{CommandExecutionResult, CommandInvocation, ExecutionHook, ProcessRunner};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// Prints the commit graph and branch heads of the current repository as DOT
const GRAPH_SCRIPT: &str = r#"
echo 'digraph git {'
echo '  rankdir=LR;'
git rev-list --all --parents 2>/dev/null | while read -r commit parents; do
  short=$(git rev-parse --short "$commit")
  subject=$(git log -1 --format=%s "$commit" | sed 's/["\\]/\\&/g')
  echo "  \"$commit\" [label=\"$short $subject\"];"
  for parent in $parents; do
    echo "  \"$commit\" -> \"$parent\";"
  done
done
git for-each-ref --format='%(refname:short) %(objectname)' refs/heads refs/remotes 2>/dev/null | while read -r ref object; do
  echo "  \"$ref\" [shape=cds, style=filled, fillcolor=darkgoldenrod1];"
  echo "  \"$ref\" -> \"$object\" [arrowhead=none];"
done
echo '}'
"#;

/// Commit graph of one repository after one command
#[derive(Debug, Clone, Serialize)]
pub struct GraphSnapshot {
    /// Position of the command in the whole run, starting at 1, counting
    /// commands that failed to run
    pub step: usize,
    pub repo: String,
    pub command: String,
    pub dot: String,
    pub taken_at: DateTime<Utc>,
}

/// [`ExecutionHook`] that records a [`GraphSnapshot`] after every command
/// that ran inside a git repository
pub struct GitSnapshotHook {
    runner: Arc<dyn ProcessRunner>,
    step: AtomicUsize,
    snapshots: Mutex<Vec<GraphSnapshot>>,
}

impl GitSnapshotHook {
    pub fn new(runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            runner,
            step: AtomicUsize::new(0),
            snapshots: Mutex::new(Vec::new()),
        }
    }

    /// Snapshots taken so far, in execution order
    pub fn snapshots(&self) -> Vec<GraphSnapshot> {
        self.snapshots
            .lock()
            .map(|snapshots| snapshots.clone())
            .unwrap_or_default()
    }

    /// Writes every snapshot to `dir` as `NNN-<repo>.dot`
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create snapshot directory {}", dir.display()))?;

        let mut written = Vec::new();
        for snapshot in self.snapshots() {
            let path = dir.join(format!("{:03}-{}.dot", snapshot.step, snapshot.repo));
            std::fs::write(&path, &snapshot.dot)
                .with_context(|| format!("Failed to write snapshot {}", path.display()))?;
            written.push(path);
        }
        Ok(written)
    }
}

#[async_trait]
impl ExecutionHook for GitSnapshotHook {
    async fn before_command(&self, _invocation: &CommandInvocation<'_>) {
        self.step.fetch_add(1, Ordering::SeqCst);
    }

    async fn after_command(
        &self,
        invocation: &CommandInvocation<'_>,
        result: &CommandExecutionResult,
    ) {
        // Commands run one at a time, so this is the step before_command opened
        let step = self.step.load(Ordering::SeqCst);

        if !is_git_repository(invocation.working_dir) {
            debug!(
                "Skipping snapshot for step {}: {} is not a git repository",
                step,
                invocation.working_dir.display()
            );
            return;
        }

        match self.runner.run(GRAPH_SCRIPT, invocation.working_dir).await {
            Ok(output) if output.exit_code == 0 => {
                let snapshot = GraphSnapshot {
                    step,
                    repo: invocation.repository.id.clone(),
                    command: result.formatted_command().to_string(),
                    dot: output.stdout,
                    taken_at: Utc::now(),
                };
                if let Ok(mut snapshots) = self.snapshots.lock() {
                    snapshots.push(snapshot);
                }
            }
            Ok(output) => warn!(
                "Snapshot for step {} exited with {}: {}",
                step,
                output.exit_code,
                output.stderr.trim()
            ),
            Err(e) => warn!("Failed to take snapshot for step {}: {}", step, e),
        }
    }
}

/// Working tree (`.git` entry) or bare repository (`HEAD` + `objects/`)
fn is_git_repository(dir: &Path) -> bool {
    dir.join(".git").exists() || (dir.join("HEAD").is_file() && dir.join("objects").is_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitscene_core::{Command, ExecutionContext, ProcessOutput, Repository, RepositoryView, User};

    struct DotRunner;

    #[async_trait]
    impl ProcessRunner for DotRunner {
        async fn run(&self, _command: &str, _cwd: &Path) -> std::io::Result<ProcessOutput> {
            Ok(ProcessOutput {
                stdout: "digraph git {\n}\n".to_string(),
                stderr: String::new(),
                exit_code: 0,
            })
        }
    }

    #[test]
    fn test_is_git_repository() {
        let dir = tempfile::tempdir().unwrap();
        assert!(!is_git_repository(dir.path()));

        std::fs::create_dir(dir.path().join(".git")).unwrap();
        assert!(is_git_repository(dir.path()));

        let bare = tempfile::tempdir().unwrap();
        std::fs::write(bare.path().join("HEAD"), "ref: refs/heads/main\n").unwrap();
        std::fs::create_dir(bare.path().join("objects")).unwrap();
        assert!(is_git_repository(bare.path()));
    }

    #[tokio::test]
    async fn test_step_counts_commands_that_failed_to_run() {
        let workspace = tempfile::tempdir().unwrap();
        std::fs::create_dir(workspace.path().join(".git")).unwrap();
        let repository = Repository::new("r1", ".").owned_by("alice");
        let context = ExecutionContext::new()
            .with_user(User::new("alice", "Alice", "alice@example.com"))
            .with_repository(repository.clone());
        let view = RepositoryView::new(&repository, &context, workspace.path()).unwrap();
        let hook = GitSnapshotHook::new(Arc::new(DotRunner));

        let broken = Command::new("echo {nope}");
        hook.before_command(&invocation(workspace.path(), &repository, &broken, 0))
            .await;

        let ok = Command::new("git status");
        let current = invocation(workspace.path(), &repository, &ok, 1);
        hook.before_command(&current).await;
        let result = ok
            .execute(workspace.path(), &context, &view, &DotRunner)
            .await
            .unwrap();
        hook.after_command(&current, &result).await;

        let snapshots = hook.snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].step, 2);
        assert_eq!(snapshots[0].command, "git status");
        assert!(snapshots[0].dot.starts_with("digraph git"));
    }

    fn invocation<'a>(
        workspace: &'a Path,
        repository: &'a Repository,
        command: &'a Command,
        index: usize,
    ) -> CommandInvocation<'a> {
        CommandInvocation {
            workspace,
            repository,
            working_dir: workspace,
            command,
            index,
        }
    }

    #[test]
    fn test_write_to_empty() {
        let hook = GitSnapshotHook::new(Arc::new(DotRunner));
        let dir = tempfile::tempdir().unwrap();
        let written = hook.write_to(&dir.path().join("snaps")).unwrap();
        assert!(written.is_empty());
        assert!(dir.path().join("snaps").is_dir());
    }
}
