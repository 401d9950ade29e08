//! Core domain types
//!
//! The entity graph: Users, Repositories (with their Remotes) and the
//! Execution Context that owns them. Entities are plain data holders that
//! validate themselves against the context they live in. Validation is purely
//! structural and referential; it never touches the filesystem.

pub mod context;
pub mod repository;
pub mod user;

pub use context::ExecutionContext;
pub use repository::{Remote, Repository};
pub use user::User;

/// Identifier of a [`User`] within an [`ExecutionContext`]
pub type UserId = String;

/// Identifier of a [`Repository`] within an [`ExecutionContext`]
pub type RepoId = String;

/// Kind of entity a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Remote,
    Repository,
    CommandSet,
    Script,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Remote => write!(f, "remote"),
            Self::Repository => write!(f, "repository"),
            Self::CommandSet => write!(f, "command set"),
            Self::Script => write!(f, "script"),
        }
    }
}
