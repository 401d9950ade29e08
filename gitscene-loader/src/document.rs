//! Scenario document structure
//!
//! Mirrors the YAML layout one to one. Converting into core types happens in
//! [`crate::parser`].

use serde::Deserialize;
use std::collections::BTreeMap;

/// Top-level scenario document
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptDocument {
    pub id: String,
    #[serde(default)]
    pub user: BTreeMap<String, UserDocument>,
    #[serde(default)]
    pub repos: BTreeMap<String, RepoDocument>,
    pub commands: Vec<CommandEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserDocument {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoDocument {
    pub path: String,
    #[serde(default)]
    pub bare: bool,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub remotes: Vec<RemoteDocument>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteDocument {
    pub name: String,
    pub repo: String,
}

/// One entry of the `commands` list
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandEntry {
    /// Target repository; inherited from the previous entry when omitted
    #[serde(default)]
    pub context: Option<String>,
    pub script: ScriptBody,
}

/// `script: cmd` or `script: [cmd, cmd]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ScriptBody {
    Single(String),
    Many(Vec<String>),
}

impl ScriptBody {
    pub fn into_commands(self) -> Vec<String> {
        match self {
            ScriptBody::Single(command) => vec![command],
            ScriptBody::Many(commands) => commands,
        }
    }
}
