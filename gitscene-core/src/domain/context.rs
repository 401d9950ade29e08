//! Execution context
//!
//! Aggregate of every User and Repository a script can refer to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{RepoId, Repository, User, UserId};
use crate::error::ValidationError;

/// The entity graph one script executes against
///
/// Owns its users and repositories exclusively. Remotes and owners are
/// resolved by id through this context, never by direct links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionContext {
    pub users: BTreeMap<UserId, User>,
    pub repos: BTreeMap<RepoId, Repository>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(users: BTreeMap<UserId, User>, repos: BTreeMap<RepoId, Repository>) -> Self {
        Self { users, repos }
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.insert(user.id.clone(), user);
        self
    }

    pub fn with_repository(mut self, repository: Repository) -> Self {
        self.repos.insert(repository.id.clone(), repository);
        self
    }

    pub fn user(&self, id: &str) -> Option<&User> {
        self.users.get(id)
    }

    pub fn repository(&self, id: &str) -> Option<&Repository> {
        self.repos.get(id)
    }

    /// Resolves the owning user of `repository`, if it has one
    pub fn owner_of(&self, repository: &Repository) -> Option<&User> {
        repository.user.as_deref().and_then(|id| self.user(id))
    }

    /// Validates every repository (and their remotes), then every user
    pub fn validate(&self) -> Result<(), ValidationError> {
        for repository in self.repos.values() {
            repository.validate(self)?;
        }
        for user in self.users.values() {
            user.validate(self)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntityKind, Remote};

    #[test]
    fn test_validate_full_graph() {
        let context = ExecutionContext::new()
            .with_user(User::new("alice", "Alice", "alice@example.com"))
            .with_repository(Repository::new("upstream", "theirs").bare(true))
            .with_repository(
                Repository::new("mine", "mine")
                    .owned_by("alice")
                    .with_remote(Remote::new("origin", "upstream")),
            );

        assert!(context.validate().is_ok());
        assert_eq!(
            context.owner_of(&context.repos["mine"]).map(|u| u.name.as_str()),
            Some("Alice")
        );
        assert!(context.owner_of(&context.repos["upstream"]).is_none());
    }

    #[test]
    fn test_validate_is_transitive() {
        let context = ExecutionContext::new()
            .with_user(User::new("alice", "Alice", "alice@example.com"))
            .with_repository(
                Repository::new("mine", "mine")
                    .owned_by("alice")
                    .with_remote(Remote::new("origin", "missing")),
            );

        let err = context.validate().unwrap_err();
        assert_eq!(err.entity(), EntityKind::Remote);
    }

    #[test]
    fn test_validate_checks_users() {
        let context =
            ExecutionContext::new().with_user(User::new("alice", "Alice", String::new()));

        let err = context.validate().unwrap_err();
        assert_eq!(err.entity(), EntityKind::User);
        assert_eq!(err.entity_id(), "alice");
    }
}
