//! Test doubles for the collaborator traits

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::process::{ProcessOutput, ProcessRunner, WorkspaceProvider};
use crate::script::{Executor, FailurePolicy};

/// Records every invocation and fakes a tiny subset of shell behaviour:
/// `echo <text>` prints `<text>`, `exit <n>` exits with `n`.
#[derive(Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for RecordingRunner {
    async fn run(&self, command: &str, cwd: &Path) -> std::io::Result<ProcessOutput> {
        self.calls
            .lock()
            .unwrap()
            .push((command.to_string(), cwd.to_path_buf()));

        let stdout = command
            .strip_prefix("echo ")
            .map(|text| format!("{text}\n"))
            .unwrap_or_default();
        let exit_code = command
            .strip_prefix("exit ")
            .and_then(|code| code.trim().parse().ok())
            .unwrap_or(0);

        Ok(ProcessOutput {
            stdout,
            stderr: String::new(),
            exit_code,
        })
    }
}

/// Allocates numbered workspaces below a temporary base directory
pub struct CountingWorkspaces {
    pub base: tempfile::TempDir,
    allocated: AtomicUsize,
}

impl CountingWorkspaces {
    pub fn new() -> Self {
        Self {
            base: tempfile::tempdir().unwrap(),
            allocated: AtomicUsize::new(0),
        }
    }

    pub fn allocated(&self) -> usize {
        self.allocated.load(Ordering::SeqCst)
    }
}

impl WorkspaceProvider for CountingWorkspaces {
    fn allocate(&self, script_id: &str) -> std::io::Result<PathBuf> {
        let n = self.allocated.fetch_add(1, Ordering::SeqCst);
        let path = self.base.path().join(format!("{script_id}-{n}"));
        std::fs::create_dir(&path)?;
        Ok(path)
    }
}

/// Executor over a [`RecordingRunner`] and fresh [`CountingWorkspaces`]
pub fn executor(policy: FailurePolicy) -> (Executor, Arc<RecordingRunner>) {
    let runner = Arc::new(RecordingRunner::new());
    let executor = Executor::new(runner.clone(), Arc::new(CountingWorkspaces::new())).with_policy(policy);
    (executor, runner)
}
