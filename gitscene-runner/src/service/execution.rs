//! Execution service
//!
//! Runs scripts with:
//! - A shell process runner built from the configured shell
//! - A fresh temporary workspace per run below the workspace base
//! - The configured failure policy
//! - Optional git graph snapshots after every command

use anyhow::{Context, Result};
use async_trait::async_trait;
use gitscene_core::{ExecutionHook, Executor, ProcessRunner, Script, ScriptResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::process::ShellProcessRunner;
use crate::snapshot::GitSnapshotHook;
use crate::workspace::TempWorkspaceProvider;

/// Service trait for executing scripts
#[async_trait]
pub trait ExecutionService: Send + Sync {
    /// Validates and executes a script in a fresh workspace
    ///
    /// # Returns
    /// The result list of the run. Failed commands are part of the result;
    /// only validation and workspace problems are returned as errors.
    async fn execute(&self, script: &mut Script) -> Result<ScriptResult>;
}

/// Standard implementation of ExecutionService
pub struct StandardExecutionService {
    config: Config,
    runner: Arc<dyn ProcessRunner>,
    snapshots: Option<Arc<GitSnapshotHook>>,
    hooks: Vec<Arc<dyn ExecutionHook>>,
}

impl StandardExecutionService {
    /// Creates a new execution service from configuration
    pub fn new(config: Config) -> Self {
        let runner: Arc<dyn ProcessRunner> = Arc::new(ShellProcessRunner::new(&config.shell));
        Self::with_runner(config, runner)
    }

    /// Creates an execution service around a custom process runner
    pub fn with_runner(config: Config, runner: Arc<dyn ProcessRunner>) -> Self {
        let snapshots = config
            .snapshots
            .then(|| Arc::new(GitSnapshotHook::new(runner.clone())));

        Self {
            config,
            runner,
            snapshots,
            hooks: Vec::new(),
        }
    }

    /// Adds a hook invoked around every command
    pub fn with_hook(mut self, hook: Arc<dyn ExecutionHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn runner(&self) -> Arc<dyn ProcessRunner> {
        self.runner.clone()
    }

    /// Snapshot hook, present when snapshots are enabled
    pub fn snapshots(&self) -> Option<&GitSnapshotHook> {
        self.snapshots.as_deref()
    }

    /// Loads a script from a YAML file and executes it
    pub async fn execute_file(&self, path: &Path) -> Result<ScriptResult> {
        let mut script = gitscene_loader::load_script_file(path)?;
        self.execute(&mut script).await
    }

    fn executor(&self) -> Executor {
        let workspaces = Arc::new(TempWorkspaceProvider::new(&self.config.workspace_base));
        let mut executor =
            Executor::new(self.runner.clone(), workspaces).with_policy(self.config.policy);

        if let Some(snapshots) = &self.snapshots {
            executor = executor.with_hook(snapshots.clone());
        }
        for hook in &self.hooks {
            executor = executor.with_hook(hook.clone());
        }
        executor
    }
}

#[async_trait]
impl ExecutionService for StandardExecutionService {
    async fn execute(&self, script: &mut Script) -> Result<ScriptResult> {
        info!(
            "Executing script '{}' with policy {}",
            script.id, self.config.policy
        );

        let result = script
            .execute(&self.executor())
            .await
            .with_context(|| format!("Failed to execute script '{}'", script.id))?;

        let failed = result.failed_commands().count();
        if result.is_success() {
            info!(
                "Script '{}' completed: {} command(s) in {}",
                result.script_id,
                result.results.len(),
                result.workspace.display()
            );
        } else {
            warn!(
                "Script '{}' completed with {} non-zero exit(s) and {} failure(s)",
                result.script_id,
                failed,
                result.failures.len()
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitscene_core::{Command, CommandSet, ExecutionContext, ProcessOutput, Repository, User};
    use std::sync::Mutex;

    #[derive(Default)]
    struct EchoRunner {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ProcessRunner for EchoRunner {
        async fn run(&self, command: &str, _cwd: &Path) -> std::io::Result<ProcessOutput> {
            self.calls.lock().unwrap().push(command.to_string());
            Ok(ProcessOutput {
                stdout: format!("{}\n", command.trim_start_matches("echo ")),
                stderr: String::new(),
                exit_code: 0,
            })
        }
    }

    fn script() -> Script {
        let context = ExecutionContext::new()
            .with_user(User::new("alice", "Alice", "alice@example.com"))
            .with_repository(Repository::new("app", "app").owned_by("alice"));
        Script::new(
            "greet",
            context,
            vec![CommandSet::new("app", vec![Command::new("echo {user.name}")])],
        )
    }

    #[tokio::test]
    async fn test_execute_with_custom_runner() {
        let base = tempfile::tempdir().unwrap();
        let runner = Arc::new(EchoRunner::default());
        let service = StandardExecutionService::with_runner(
            Config::new(base.path().to_path_buf()),
            runner.clone(),
        );

        let mut script = script();
        let result = service.execute(&mut script).await.unwrap();

        assert!(result.is_success());
        assert_eq!(result.results.len(), 1);
        assert_eq!(result.results[0].stdout(), "Alice\n");
        assert!(result.workspace.starts_with(base.path()));
        assert_eq!(*runner.calls.lock().unwrap(), vec!["echo Alice".to_string()]);
    }

    #[test]
    fn test_snapshots_disabled_by_default() {
        let service = StandardExecutionService::new(Config::default());
        assert!(service.snapshots().is_none());

        let service = StandardExecutionService::new(Config::default().with_snapshots(true));
        assert!(service.snapshots().is_some());
    }

    #[tokio::test]
    async fn test_invalid_script_is_an_error() {
        let base = tempfile::tempdir().unwrap();
        let service = StandardExecutionService::with_runner(
            Config::new(base.path().to_path_buf()),
            Arc::new(EchoRunner::default()),
        );

        let mut script = Script::new(
            "broken",
            ExecutionContext::new(),
            vec![CommandSet::new("missing", vec![Command::new("echo hi")])],
        );

        assert!(service.execute(&mut script).await.is_err());
        assert_eq!(std::fs::read_dir(base.path()).unwrap().count(), 0);
    }
}
