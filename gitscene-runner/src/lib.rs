//! gitscene Runner
//!
//! Concrete collaborators for the core execution model:
//! - Configuration: workspace base, shell and failure policy from the environment
//! - Process: shell invocation with an explicit working directory
//! - Workspace: fresh per-run directories below the workspace base
//! - Snapshot: git graph snapshots taken after every command
//! - Service: wires the above into a ready-to-use execution service

pub mod config;
pub mod process;
pub mod service;
pub mod snapshot;
pub mod workspace;

pub use config::Config;
pub use process::ShellProcessRunner;
pub use service::{ExecutionService, StandardExecutionService};
pub use snapshot::{GitSnapshotHook, GraphSnapshot};
pub use workspace::TempWorkspaceProvider;
