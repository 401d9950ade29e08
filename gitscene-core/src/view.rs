//! Execution views
//!
//! A [`RepositoryView`] is the workspace-aware form of a [`Repository`] that
//! commands are formatted against. It borrows the canonical entity and is
//! built fresh for every Command Set execution; nothing is written back into
//! the [`ExecutionContext`].

use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::domain::{EntityKind, ExecutionContext, Remote, Repository, User};
use crate::error::ValidationError;
use crate::workspace;

/// A remote bound to the workspace so its on-disk location is known
#[derive(Debug, Clone, Copy)]
pub struct RemoteView<'a> {
    pub remote: &'a Remote,
    /// The repository the remote points at
    pub target: &'a Repository,
    workspace: &'a Path,
}

impl<'a> RemoteView<'a> {
    /// Absolute path of the remote's target repository inside the workspace
    pub fn remote_path(&self) -> PathBuf {
        workspace::resolve(self.workspace, &self.target.path)
    }

    fn to_value(&self) -> Value {
        json!({
            "name": self.remote.name,
            "repo": self.remote.repo,
            "remote_path": self.remote_path().to_string_lossy(),
            "repository": repository_summary(self.target),
        })
    }
}

/// A repository together with the workspace it is being executed in
#[derive(Debug, Clone)]
pub struct RepositoryView<'a> {
    pub repository: &'a Repository,
    pub context: &'a ExecutionContext,
    workspace: &'a Path,
    remotes: BTreeMap<&'a str, RemoteView<'a>>,
}

impl<'a> RepositoryView<'a> {
    /// Wraps `repository` and each of its remotes for `workspace`
    ///
    /// Fails if a remote points at a repository missing from `context`,
    /// which cannot happen once the context has been validated.
    pub fn new(
        repository: &'a Repository,
        context: &'a ExecutionContext,
        workspace: &'a Path,
    ) -> Result<Self, ValidationError> {
        let mut remotes = BTreeMap::new();
        for (name, remote) in &repository.remotes {
            let target = context.repository(&remote.repo).ok_or_else(|| {
                ValidationError::dangling(EntityKind::Remote, &remote.name, "repo", &remote.repo)
            })?;
            remotes.insert(
                name.as_str(),
                RemoteView {
                    remote,
                    target,
                    workspace,
                },
            );
        }

        Ok(Self {
            repository,
            context,
            workspace,
            remotes,
        })
    }

    pub fn workspace(&self) -> &Path {
        self.workspace
    }

    /// Absolute directory commands for this repository run in
    pub fn working_dir(&self) -> PathBuf {
        workspace::resolve(self.workspace, &self.repository.path)
    }

    pub fn remote(&self, name: &str) -> Option<&RemoteView<'a>> {
        self.remotes.get(name)
    }

    pub fn remotes(&self) -> impl Iterator<Item = &RemoteView<'a>> {
        self.remotes.values()
    }

    /// The owning user, if any
    pub fn owner(&self) -> Option<&'a User> {
        self.context.owner_of(self.repository)
    }

    /// Template value of the repository, with workspace-aware remotes
    pub fn to_value(&self) -> Value {
        let remotes: Map<String, Value> = self
            .remotes
            .iter()
            .map(|(name, remote)| (name.to_string(), remote.to_value()))
            .collect();

        let mut value = repository_summary(self.repository);
        if let Value::Object(fields) = &mut value {
            fields.insert("remotes".to_string(), Value::Object(remotes));
        }
        value
    }
}

/// Template value of a repository without remotes
fn repository_summary(repository: &Repository) -> Value {
    json!({
        "id": repository.id,
        "path": repository.path,
        "bare": repository.bare,
        "user": repository.user,
    })
}

/// Template value of a repository as stored in the context
pub(crate) fn repository_value(repository: &Repository) -> Value {
    let remotes: Map<String, Value> = repository
        .remotes
        .iter()
        .map(|(name, remote)| {
            (
                name.clone(),
                json!({ "name": remote.name, "repo": remote.repo }),
            )
        })
        .collect();

    let mut value = repository_summary(repository);
    if let Value::Object(fields) = &mut value {
        fields.insert("remotes".to_string(), Value::Object(remotes));
    }
    value
}

pub(crate) fn user_value(user: &User) -> Value {
    json!({
        "id": user.id,
        "name": user.name,
        "email": user.email,
    })
}
