//! Collaborator traits
//!
//! The execution model delegates every side effect it does not own:
//! - [`ProcessRunner`]: runs one shell command in an explicit directory
//! - [`WorkspaceProvider`]: allocates the fresh workspace for a script run
//! - [`ExecutionHook`]: observes commands before and after they run
//!
//! Concrete implementations live in `gitscene-runner`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use crate::command::Command;
use crate::domain::Repository;
use crate::result::CommandExecutionResult;

/// Captured output of a finished process
///
/// Output is kept in full and never trimmed. It is decoded as UTF-8; bytes
/// that are not valid UTF-8 are replaced with U+FFFD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Runs shell commands
///
/// The working directory is always passed explicitly; implementations must
/// not depend on or change the process-wide current directory.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `command` through a shell with `cwd` as its working directory
    ///
    /// # Errors
    /// Returns an error only when the process cannot be started. A command
    /// that runs and exits non-zero is reported through [`ProcessOutput`].
    async fn run(&self, command: &str, cwd: &Path) -> std::io::Result<ProcessOutput>;
}

/// Allocates workspaces for script runs
pub trait WorkspaceProvider: Send + Sync {
    /// Creates a new, empty directory for one execution of `script_id`
    ///
    /// The directory is never removed by the execution model.
    fn allocate(&self, script_id: &str) -> std::io::Result<PathBuf>;
}

/// A command about to run, or that just ran
#[derive(Debug, Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub workspace: &'a Path,
    pub repository: &'a Repository,
    /// Absolute directory the command runs in
    pub working_dir: &'a Path,
    pub command: &'a Command,
    /// Position of the command within its Command Set
    pub index: usize,
}

/// Observer invoked around every command of a script run
///
/// Hooks cannot fail a run; implementations log their own problems.
#[async_trait]
pub trait ExecutionHook: Send + Sync {
    async fn before_command(&self, _invocation: &CommandInvocation<'_>) {}

    async fn after_command(
        &self,
        _invocation: &CommandInvocation<'_>,
        _result: &CommandExecutionResult,
    ) {
    }
}
