//! gitscene Loader
//!
//! Turns a YAML scenario document into a [`Script`]:
//! - `id`: script identifier
//! - `user`: user-id → `{name, email}`
//! - `repos`: repo-id → `{path, bare?, user?, remotes: [{name, repo}]}`
//! - `commands`: ordered `{context?, script}` entries, where `script` is one
//!   command or a list of commands and a missing `context` reuses the
//!   previous entry's repository
//!
//! The loader only builds the entity graph. Referential checks are left to
//! [`Script::validate`].

pub mod document;
pub mod parser;

pub use document::ScriptDocument;
pub use gitscene_core::Script;
pub use parser::{load_script, load_script_file};
