//! Execution results
//!
//! These types only exist as the output of a script run. They are not fed
//! back into the execution model.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use std::path::PathBuf;

use crate::command::Command;
use crate::domain::RepoId;
use crate::error::ExecutionError;
use crate::process::ProcessOutput;

/// Outcome of one command that ran
///
/// Carries the fully formatted command text that was handed to the shell,
/// not the template it came from.
#[derive(Debug, Clone, Serialize)]
pub struct CommandExecutionResult {
    command: Command,
    formatted_command: String,
    stdout: String,
    stderr: String,
    exit_code: i32,
    pwd: String,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
}

impl CommandExecutionResult {
    pub(crate) fn new(
        command: Command,
        formatted_command: String,
        output: ProcessOutput,
        pwd: String,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            command,
            formatted_command,
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.exit_code,
            pwd,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// The originating command template
    pub fn command(&self) -> &Command {
        &self.command
    }

    pub fn formatted_command(&self) -> &str {
        &self.formatted_command
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Repository path, relative to the workspace, the command ran in
    pub fn pwd(&self) -> &str {
        &self.pwd
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn finished_at(&self) -> DateTime<Utc> {
        self.finished_at
    }

    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

impl std::fmt::Display for CommandExecutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} : {}",
            self.formatted_command,
            self.exit_code,
            self.stdout.trim_end()
        )
    }
}

/// A command that could not run (template, path or spawn failure)
#[derive(Debug, Serialize)]
pub struct CommandFailure {
    /// Target repository of the Command Set the command belongs to
    pub repo: RepoId,
    /// Position of the command within its Command Set
    pub command_index: usize,
    pub command: Command,
    #[serde(serialize_with = "serialize_display")]
    pub error: ExecutionError,
}

/// Results of everything one Command Set ran
#[derive(Debug, Default, Serialize)]
pub struct CommandSetReport {
    pub results: Vec<CommandExecutionResult>,
    pub failures: Vec<CommandFailure>,
    /// Commands were skipped because of the failure policy
    pub halted: bool,
}

/// Outcome of one script execution
#[derive(Debug, Serialize)]
pub struct ScriptResult {
    pub script_id: String,
    /// Workspace the script ran in; left on disk for the caller to inspect
    pub workspace: PathBuf,
    /// Results in execution order
    pub results: Vec<CommandExecutionResult>,
    pub failures: Vec<CommandFailure>,
    /// The run stopped early because of the failure policy
    pub halted: bool,
}

impl ScriptResult {
    /// Commands that ran but exited non-zero
    pub fn failed_commands(&self) -> impl Iterator<Item = &CommandExecutionResult> {
        self.results.iter().filter(|result| !result.success())
    }

    /// Every command ran and exited zero
    pub fn is_success(&self) -> bool {
        !self.halted && self.failures.is_empty() && self.results.iter().all(|r| r.success())
    }
}

fn serialize_display<S: Serializer>(error: &ExecutionError, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(error)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(exit_code: i32) -> CommandExecutionResult {
        CommandExecutionResult::new(
            Command::new("echo {repo.id}"),
            "echo mine".to_string(),
            ProcessOutput {
                stdout: "mine\n".to_string(),
                stderr: String::new(),
                exit_code,
            },
            "mine".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_display() {
        assert_eq!(result(0).to_string(), "echo mine -> 0 : mine");
    }

    #[test]
    fn test_script_result_success() {
        let mut script_result = ScriptResult {
            script_id: "demo".to_string(),
            workspace: PathBuf::from("/tmp/ws"),
            results: vec![result(0), result(0)],
            failures: Vec::new(),
            halted: false,
        };
        assert!(script_result.is_success());
        assert_eq!(script_result.failed_commands().count(), 0);

        script_result.results.push(result(2));
        assert!(!script_result.is_success());
        assert_eq!(script_result.failed_commands().count(), 1);
    }

    #[test]
    fn test_failure_serializes_error_message() {
        let failure = CommandFailure {
            repo: "mine".to_string(),
            command_index: 0,
            command: Command::new("echo {nope}"),
            error: ExecutionError::PathConflict {
                path: PathBuf::from("/tmp/ws/mine"),
            },
        };
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["command"], "echo {nope}");
        assert!(json["error"].as_str().unwrap().contains("/tmp/ws/mine"));
    }
}
