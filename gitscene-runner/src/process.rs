//! Shell process runner
//!
//! Runs each command as `<shell> -c <command>` with the working directory set
//! on the child process only. The runner's own current directory is never
//! changed, so several runs can share one process safely.

use async_trait::async_trait;
use gitscene_core::{ProcessOutput, ProcessRunner};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::config::DEFAULT_SHELL;

/// [`ProcessRunner`] backed by a system shell
#[derive(Debug, Clone)]
pub struct ShellProcessRunner {
    shell: String,
}

impl ShellProcessRunner {
    pub fn new(shell: impl Into<String>) -> Self {
        Self {
            shell: shell.into(),
        }
    }

    pub fn shell(&self) -> &str {
        &self.shell
    }
}

impl Default for ShellProcessRunner {
    fn default() -> Self {
        Self::new(DEFAULT_SHELL)
    }
}

#[async_trait]
impl ProcessRunner for ShellProcessRunner {
    async fn run(&self, command: &str, cwd: &Path) -> std::io::Result<ProcessOutput> {
        debug!("Spawning {} -c {:?} in {}", self.shell, command, cwd.display());

        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(command)
            .current_dir(cwd)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout).to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        // Killed by a signal: no exit code
        let exit_code = output.status.code().unwrap_or(-1);

        if !output.status.success() {
            debug!(
                "Command exited with {}: stdout='{}' stderr='{}'",
                exit_code,
                stdout.trim(),
                stderr.trim()
            );
        }

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_utf8_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let output = ShellProcessRunner::default()
            .run("printf 'a\\377b'", dir.path())
            .await
            .unwrap();

        assert_eq!(output.stdout, "a\u{FFFD}b");
        assert_eq!(output.exit_code, 0);
    }

    #[tokio::test]
    async fn test_captures_output_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let runner = ShellProcessRunner::default();

        let output = runner
            .run("printf '  a\\n\\n'; printf 'err' >&2", dir.path())
            .await
            .unwrap();

        assert_eq!(output.stdout, "  a\n\n");
        assert_eq!(output.stderr, "err");
        assert_eq!(output.exit_code, 0);
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = ShellProcessRunner::default()
            .run("exit 7", dir.path())
            .await
            .unwrap();
        assert_eq!(output.exit_code, 7);
    }

    #[tokio::test]
    async fn test_runs_in_given_directory() {
        let dir = tempfile::tempdir().unwrap();
        let before = std::env::current_dir().unwrap();

        let output = ShellProcessRunner::default()
            .run("touch marker && pwd", dir.path())
            .await
            .unwrap();

        assert!(dir.path().join("marker").exists());
        assert_eq!(output.exit_code, 0);
        assert_eq!(std::env::current_dir().unwrap(), before);
    }

    #[tokio::test]
    async fn test_missing_shell_fails_to_spawn() {
        let dir = tempfile::tempdir().unwrap();
        let result = ShellProcessRunner::new("/nonexistent/shell")
            .run("true", dir.path())
            .await;
        assert!(result.is_err());
    }
}
