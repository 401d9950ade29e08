//! Error types for gitscene core
//!
//! Validation failures are raised before anything runs. Template and path
//! failures belong to a single command. A non-zero exit status is not an
//! error at all: it is recorded in the command's result.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::EntityKind;

/// Structural or referential defect in the entity graph
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is empty or unset
    #[error("{entity} '{id}': field '{field}' is not set")]
    MissingField {
        entity: EntityKind,
        id: String,
        field: &'static str,
    },

    /// A field names an entity that does not exist in the context
    #[error("{entity} '{id}': field '{field}' refers to unknown '{target}'")]
    DanglingReference {
        entity: EntityKind,
        id: String,
        field: &'static str,
        target: String,
    },

    /// A field is set but its value cannot be used
    #[error("{entity} '{id}': field '{field}' is invalid: {reason}")]
    InvalidField {
        entity: EntityKind,
        id: String,
        field: &'static str,
        reason: String,
    },
}

impl ValidationError {
    pub fn missing(entity: EntityKind, id: &str, field: &'static str) -> Self {
        Self::MissingField {
            entity,
            id: id.to_string(),
            field,
        }
    }

    pub fn dangling(entity: EntityKind, id: &str, field: &'static str, target: &str) -> Self {
        Self::DanglingReference {
            entity,
            id: id.to_string(),
            field,
            target: target.to_string(),
        }
    }

    pub fn invalid(entity: EntityKind, id: &str, field: &'static str, reason: &str) -> Self {
        Self::InvalidField {
            entity,
            id: id.to_string(),
            field,
            reason: reason.to_string(),
        }
    }

    /// Kind of the offending entity
    pub fn entity(&self) -> EntityKind {
        match self {
            Self::MissingField { entity, .. }
            | Self::DanglingReference { entity, .. }
            | Self::InvalidField { entity, .. } => *entity,
        }
    }

    /// Id of the offending entity (may be empty when the id itself is missing)
    pub fn entity_id(&self) -> &str {
        match self {
            Self::MissingField { id, .. }
            | Self::DanglingReference { id, .. }
            | Self::InvalidField { id, .. } => id,
        }
    }

    /// Name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingField { field, .. }
            | Self::DanglingReference { field, .. }
            | Self::InvalidField { field, .. } => field,
        }
    }
}

/// A command template could not be rendered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// The template text is not well formed
    #[error("malformed template at byte {position}: {reason}")]
    Malformed { position: usize, reason: String },

    /// The expression starts with something other than a known variable
    #[error("undefined variable '{variable}' in '{{{expression}}}'")]
    UndefinedVariable { expression: String, variable: String },

    /// A field along the expression's path does not exist
    #[error("unknown field '{field}' in '{{{expression}}}'")]
    UnknownField { expression: String, field: String },

    /// The expression resolved to nothing (e.g. `user` of an ownerless bare repository)
    #[error("'{{{expression}}}' has no value")]
    Absent { expression: String },

    /// The expression resolved to a map or list instead of a plain value
    #[error("'{{{expression}}}' does not resolve to a plain value")]
    NotScalar { expression: String },
}

/// Failure of a single command
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    /// A directory was required but a non-directory occupies the path
    #[error("path conflict: {} exists and is not a directory", path.display())]
    PathConflict { path: PathBuf },

    #[error("failed to prepare {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The shell could not be started at all
    #[error("failed to spawn '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a whole script run
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("invalid script: {0}")]
    Validation(#[from] ValidationError),

    #[error("failed to allocate workspace: {0}")]
    Workspace(#[source] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_accessors() {
        let err = ValidationError::dangling(EntityKind::Remote, "origin", "repo", "upstream");
        assert_eq!(err.entity(), EntityKind::Remote);
        assert_eq!(err.entity_id(), "origin");
        assert_eq!(err.field(), "repo");
        assert_eq!(
            err.to_string(),
            "remote 'origin': field 'repo' refers to unknown 'upstream'"
        );
    }

    #[test]
    fn test_template_error_display() {
        let err = TemplateError::UndefinedVariable {
            expression: "foo.bar".to_string(),
            variable: "foo".to_string(),
        };
        assert_eq!(err.to_string(), "undefined variable 'foo' in '{foo.bar}'");
    }

    #[test]
    fn test_path_conflict_display() {
        let err = ExecutionError::PathConflict {
            path: PathBuf::from("/tmp/ws/mine"),
        };
        assert!(err.to_string().contains("/tmp/ws/mine"));
    }
}
