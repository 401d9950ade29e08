//! Scripts
//!
//! A [`Script`] owns one [`ExecutionContext`] and an ordered list of
//! [`CommandSet`]s. Executing it moves through
//! `Unvalidated → Validated → Executing → Completed`: the whole graph is
//! validated before any resource is allocated, then every Command Set runs in
//! declared order inside one fresh workspace.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::command::CommandSet;
use crate::domain::{ExecutionContext, RepoId};
use crate::error::{ScriptError, TemplateError, ValidationError};
use crate::process::{ExecutionHook, ProcessRunner, WorkspaceProvider};
use crate::result::ScriptResult;

/// Lifecycle state of a [`Script`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptState {
    Unvalidated,
    Validated,
    Executing,
    Completed,
}

/// What to do when a command cannot run (template, path or spawn failure)
///
/// Commands that run and exit non-zero never trigger the policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Record the failure and keep going
    #[default]
    Continue,
    /// Skip the remaining commands of the failing Command Set
    AbortSet,
    /// Stop the whole script
    AbortScript,
}

impl FailurePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Continue => "continue",
            Self::AbortSet => "abort-set",
            Self::AbortScript => "abort-script",
        }
    }
}

impl std::fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown [`FailurePolicy`] name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown failure policy '{0}' (expected continue, abort-set or abort-script)")]
pub struct ParsePolicyError(String);

impl FromStr for FailurePolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort-set" => Ok(Self::AbortSet),
            "abort-script" => Ok(Self::AbortScript),
            other => Err(ParsePolicyError(other.to_string())),
        }
    }
}

/// The collaborators and policy a script executes with
#[derive(Clone)]
pub struct Executor {
    runner: Arc<dyn ProcessRunner>,
    workspaces: Arc<dyn WorkspaceProvider>,
    hooks: Vec<Arc<dyn ExecutionHook>>,
    policy: FailurePolicy,
}

impl Executor {
    pub fn new(runner: Arc<dyn ProcessRunner>, workspaces: Arc<dyn WorkspaceProvider>) -> Self {
        Self {
            runner,
            workspaces,
            hooks: Vec::new(),
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_hook(mut self, hook: Arc<dyn ExecutionHook>) -> Self {
        self.hooks.push(hook);
        self
    }

    pub fn runner(&self) -> &dyn ProcessRunner {
        self.runner.as_ref()
    }

    pub fn workspaces(&self) -> &dyn WorkspaceProvider {
        self.workspaces.as_ref()
    }

    pub fn hooks(&self) -> &[Arc<dyn ExecutionHook>] {
        &self.hooks
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }
}

/// A formatted command from a dry run
#[derive(Debug)]
pub struct PlannedCommand {
    pub repo: RepoId,
    pub template: String,
    pub formatted: Result<String, TemplateError>,
}

/// An ordered list of Command Sets over one entity graph
#[derive(Debug, Clone)]
pub struct Script {
    pub id: String,
    pub context: ExecutionContext,
    pub command_sets: Vec<CommandSet>,
    state: ScriptState,
}

impl Script {
    pub fn new(
        id: impl Into<String>,
        context: ExecutionContext,
        command_sets: Vec<CommandSet>,
    ) -> Self {
        Self {
            id: id.into(),
            context,
            command_sets,
            state: ScriptState::Unvalidated,
        }
    }

    pub fn state(&self) -> ScriptState {
        self.state
    }

    /// Validates the context, then every Command Set's target
    pub fn validate(&mut self) -> Result<(), ValidationError> {
        let outcome = self.check();
        self.transition(match outcome {
            Ok(()) => ScriptState::Validated,
            Err(_) => ScriptState::Unvalidated,
        });
        outcome
    }

    fn check(&self) -> Result<(), ValidationError> {
        self.context.validate()?;
        for set in &self.command_sets {
            set.validate(&self.context)?;
        }
        Ok(())
    }

    fn transition(&mut self, next: ScriptState) {
        debug!("Script '{}': {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
    }

    /// Formats every command against `workspace` without running anything
    pub fn plan(&mut self, workspace: &Path) -> Result<Vec<PlannedCommand>, ValidationError> {
        self.validate()?;

        let mut planned = Vec::new();
        for set in &self.command_sets {
            let formatted = set.format_commands(workspace, &self.context)?;
            for (command, formatted) in set.commands.iter().zip(formatted) {
                planned.push(PlannedCommand {
                    repo: set.repo.clone(),
                    template: command.text().to_string(),
                    formatted,
                });
            }
        }
        Ok(planned)
    }

    /// Validates, allocates one workspace and runs every Command Set in order
    ///
    /// Nothing is allocated when validation fails. The workspace is left on
    /// disk; its path is part of the returned [`ScriptResult`].
    pub async fn execute(&mut self, executor: &Executor) -> Result<ScriptResult, ScriptError> {
        self.validate()?;

        let workspace: PathBuf = executor
            .workspaces()
            .allocate(&self.id)
            .map_err(ScriptError::Workspace)?;
        self.transition(ScriptState::Executing);

        info!(
            "Executing script '{}' ({} command set(s)) in {}",
            self.id,
            self.command_sets.len(),
            workspace.display()
        );

        let mut result = ScriptResult {
            script_id: self.id.clone(),
            workspace,
            results: Vec::new(),
            failures: Vec::new(),
            halted: false,
        };

        for set in &self.command_sets {
            let report = set
                .execute(&result.workspace, &self.context, executor)
                .await?;

            result.results.extend(report.results);
            result.failures.extend(report.failures);

            if report.halted && executor.policy() == FailurePolicy::AbortScript {
                warn!("Script '{}' halted after a failed command", self.id);
                result.halted = true;
                break;
            }
        }

        self.transition(ScriptState::Completed);
        info!(
            "Script '{}' completed: {} command(s) ran, {} failed to run",
            self.id,
            result.results.len(),
            result.failures.len()
        );
        Ok(result)
    }
}
