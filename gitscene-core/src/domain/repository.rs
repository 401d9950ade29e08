//! Repository and Remote domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Component, Path};

use crate::domain::{EntityKind, ExecutionContext, RepoId, UserId};
use crate::error::ValidationError;

/// A named reference from one repository to another in the same context
///
/// Holds the target's id only. The target is resolved through the
/// [`ExecutionContext`] whenever it is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Remote {
    pub name: String,
    pub repo: RepoId,
}

impl Remote {
    pub fn new(name: impl Into<String>, repo: impl Into<RepoId>) -> Self {
        Self {
            name: name.into(),
            repo: repo.into(),
        }
    }

    /// Checks that the remote is named and points at a repository of `context`
    pub fn validate(&self, context: &ExecutionContext) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::missing(EntityKind::Remote, &self.name, "name"));
        }
        if self.repo.is_empty() {
            return Err(ValidationError::missing(EntityKind::Remote, &self.name, "repo"));
        }
        if context.repository(&self.repo).is_none() {
            return Err(ValidationError::dangling(
                EntityKind::Remote,
                &self.name,
                "repo",
                &self.repo,
            ));
        }
        Ok(())
    }
}

/// A git repository living at `path` inside the workspace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: RepoId,
    /// Path relative to the workspace
    pub path: String,
    #[serde(default)]
    pub bare: bool,
    /// Owning user, required unless the repository is bare
    pub user: Option<UserId>,
    #[serde(default)]
    pub remotes: BTreeMap<String, Remote>,
}

impl Repository {
    pub fn new(id: impl Into<RepoId>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            bare: false,
            user: None,
            remotes: BTreeMap::new(),
        }
    }

    pub fn bare(mut self, bare: bool) -> Self {
        self.bare = bare;
        self
    }

    pub fn owned_by(mut self, user: impl Into<UserId>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Adds a remote, replacing any remote of the same name
    pub fn with_remote(mut self, remote: Remote) -> Self {
        self.remotes.insert(remote.name.clone(), remote);
        self
    }

    /// Validates the repository and, transitively, all of its remotes
    pub fn validate(&self, context: &ExecutionContext) -> Result<(), ValidationError> {
        let missing = |field| ValidationError::missing(EntityKind::Repository, &self.id, field);

        if self.id.is_empty() {
            return Err(missing("id"));
        }
        if self.path.is_empty() {
            return Err(missing("path"));
        }
        if Path::new(&self.path)
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(ValidationError::invalid(
                EntityKind::Repository,
                &self.id,
                "path",
                "'..' would leave the workspace",
            ));
        }
        if self.user.is_none() && !self.bare {
            return Err(missing("user"));
        }

        for remote in self.remotes.values() {
            remote.validate(context)?;
        }

        if let Some(user) = &self.user {
            if context.user(user).is_none() {
                return Err(ValidationError::dangling(
                    EntityKind::Repository,
                    &self.id,
                    "user",
                    user,
                ));
            }
        }
        Ok(())
    }
}
