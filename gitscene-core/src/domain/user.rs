//! User domain type

use serde::{Deserialize, Serialize};

use crate::domain::{EntityKind, ExecutionContext, UserId};
use crate::error::ValidationError;

/// A user that owns repositories and appears in templated commands
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: impl Into<UserId>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Checks that id, name and email are all set
    pub fn validate(&self, _context: &ExecutionContext) -> Result<(), ValidationError> {
        let missing = |field| ValidationError::missing(EntityKind::User, &self.id, field);

        if self.id.is_empty() {
            return Err(missing("id"));
        }
        if self.name.is_empty() {
            return Err(missing("name"));
        }
        if self.email.is_empty() {
            return Err(missing("email"));
        }
        Ok(())
    }
}
