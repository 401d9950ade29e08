//! gitscene Core
//!
//! Core types and execution model for gitscene.
//!
//! This crate contains:
//! - Domain types: Users, Repositories and their Remotes, the Execution Context
//! - Templating: binding command text to a repository/user at execution time
//! - Execution: Command, Command Set and Script, run against a shared workspace
//! - Collaborator traits: process spawning, workspace allocation, execution hooks

pub mod command;
pub mod domain;
pub mod error;
pub mod process;
pub mod result;
pub mod script;
pub mod template;
pub mod view;
pub mod workspace;

#[cfg(test)]
mod testing;

pub use command::{Command, CommandSet};
pub use domain::{EntityKind, ExecutionContext, Remote, RepoId, Repository, User, UserId};
pub use error::{ExecutionError, ScriptError, TemplateError, ValidationError};
pub use process::{CommandInvocation, ExecutionHook, ProcessOutput, ProcessRunner, WorkspaceProvider};
pub use result::{CommandExecutionResult, CommandFailure, CommandSetReport, ScriptResult};
pub use script::{Executor, FailurePolicy, ParsePolicyError, PlannedCommand, Script, ScriptState};
pub use template::{Template, TemplateScope};
pub use view::{RemoteView, RepositoryView};
