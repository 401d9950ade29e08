//! Commands and Command Sets
//!
//! A [`Command`] is raw template text. It is bound to a repository only when
//! it is formatted or executed, so its validity is a runtime matter.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info, warn};

use crate::domain::{EntityKind, ExecutionContext, RepoId};
use crate::error::{ExecutionError, TemplateError, ValidationError};
use crate::process::{CommandInvocation, ProcessRunner};
use crate::result::{CommandExecutionResult, CommandFailure, CommandSetReport};
use crate::script::{Executor, FailurePolicy};
use crate::template::{Template, TemplateScope};
use crate::view::RepositoryView;
use crate::workspace;

/// A single templated shell command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command {
    text: String,
}

impl Command {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The raw template text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Binds the template to `repository` and the whole `context`
    ///
    /// Pure: no I/O, and identical inputs always give identical output.
    pub fn format(
        &self,
        context: &ExecutionContext,
        repository: &RepositoryView<'_>,
    ) -> Result<String, TemplateError> {
        let scope = TemplateScope::new(context, repository);
        Template::parse(&self.text)?.render(&scope)
    }

    /// Formats and runs the command inside `workspace`
    ///
    /// The command runs in `workspace/<repository path>`, which is created
    /// if needed. The directory is passed to `runner` explicitly; the
    /// caller's current directory is left untouched.
    ///
    /// # Errors
    /// - [`ExecutionError::PathConflict`] if the workspace or repository
    ///   directory is occupied by a file
    /// - [`ExecutionError::Template`] if the command cannot be formatted
    /// - [`ExecutionError::Spawn`] if the shell cannot be started
    ///
    /// A non-zero exit status is not an error; it is part of the result.
    pub async fn execute(
        &self,
        workspace: &Path,
        context: &ExecutionContext,
        repository: &RepositoryView<'_>,
        runner: &dyn ProcessRunner,
    ) -> Result<CommandExecutionResult, ExecutionError> {
        workspace::ensure_dir(workspace)?;

        let formatted = self.format(context, repository)?;

        let repo_path = &repository.repository.path;
        let working_dir = workspace::resolve(workspace, repo_path);
        workspace::ensure_dir(&working_dir)?;

        debug!("Running in {}: {}", working_dir.display(), formatted);
        let started_at = Utc::now();
        let output = runner
            .run(&formatted, &working_dir)
            .await
            .map_err(|source| ExecutionError::Spawn {
                command: formatted.clone(),
                source,
            })?;

        debug!(
            "Command finished: exit_code={}, stdout_len={}, stderr_len={}",
            output.exit_code,
            output.stdout.len(),
            output.stderr.len()
        );

        Ok(CommandExecutionResult::new(
            self.clone(),
            formatted,
            output,
            repo_path.clone(),
            started_at,
        ))
    }
}

impl From<&str> for Command {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Command {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// Ordered commands that all run against one repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSet {
    pub repo: RepoId,
    pub commands: Vec<Command>,
}

impl CommandSet {
    pub fn new(repo: impl Into<RepoId>, commands: Vec<Command>) -> Self {
        Self {
            repo: repo.into(),
            commands,
        }
    }

    /// Checks that the target repository exists in `context`
    pub fn validate(&self, context: &ExecutionContext) -> Result<(), ValidationError> {
        if self.repo.is_empty() {
            return Err(ValidationError::missing(EntityKind::CommandSet, &self.repo, "repo"));
        }
        if context.repository(&self.repo).is_none() {
            return Err(ValidationError::dangling(
                EntityKind::CommandSet,
                &self.repo,
                "repo",
                &self.repo,
            ));
        }
        Ok(())
    }

    /// Builds the workspace-aware view of the target repository
    pub fn view<'a>(
        &self,
        workspace: &'a Path,
        context: &'a ExecutionContext,
    ) -> Result<RepositoryView<'a>, ValidationError> {
        let repository = context.repository(&self.repo).ok_or_else(|| {
            ValidationError::dangling(EntityKind::CommandSet, &self.repo, "repo", &self.repo)
        })?;
        RepositoryView::new(repository, context, workspace)
    }

    /// Formats every command without running anything
    pub fn format_commands(
        &self,
        workspace: &Path,
        context: &ExecutionContext,
    ) -> Result<Vec<Result<String, TemplateError>>, ValidationError> {
        let view = self.view(workspace, context)?;
        Ok(self
            .commands
            .iter()
            .map(|command| command.format(context, &view))
            .collect())
    }

    /// Runs every command in order against the same workspace and view
    ///
    /// A command that cannot run is recorded as a [`CommandFailure`]; what
    /// happens to the rest of the set depends on the executor's policy.
    pub async fn execute(
        &self,
        workspace: &Path,
        context: &ExecutionContext,
        executor: &Executor,
    ) -> Result<CommandSetReport, ValidationError> {
        let view = self.view(workspace, context)?;
        let working_dir = view.working_dir();
        let mut report = CommandSetReport::default();

        info!(
            "Executing {} command(s) against repository '{}'",
            self.commands.len(),
            self.repo
        );

        for (index, command) in self.commands.iter().enumerate() {
            let invocation = CommandInvocation {
                workspace,
                repository: view.repository,
                working_dir: &working_dir,
                command,
                index,
            };

            for hook in executor.hooks() {
                hook.before_command(&invocation).await;
            }

            match command
                .execute(workspace, context, &view, executor.runner())
                .await
            {
                Ok(result) => {
                    if !result.success() {
                        info!(
                            "Command {} in '{}' exited with {}",
                            index,
                            self.repo,
                            result.exit_code()
                        );
                    }
                    for hook in executor.hooks() {
                        hook.after_command(&invocation, &result).await;
                    }
                    report.results.push(result);
                }
                Err(error) => {
                    warn!("Command {} in '{}' failed: {}", index, self.repo, error);
                    report.failures.push(CommandFailure {
                        repo: self.repo.clone(),
                        command_index: index,
                        command: command.clone(),
                        error,
                    });

                    if executor.policy() != FailurePolicy::Continue {
                        report.halted = true;
                        break;
                    }
                }
            }
        }

        Ok(report)
    }
}
