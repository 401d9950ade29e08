//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod plan;
mod run;
mod validate;

use anyhow::Result;
use clap::Subcommand;
use std::path::PathBuf;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Execute a scenario in a fresh workspace
    Run {
        /// Path to the YAML scenario
        file: PathBuf,

        /// Write a git graph snapshot per command into this directory
        #[arg(long, value_name = "DIR")]
        snapshots: Option<PathBuf>,
    },
    /// Check a scenario without running anything
    Validate {
        /// Path to the YAML scenario
        file: PathBuf,
    },
    /// Show every command as it would run
    Plan {
        /// Path to the YAML scenario
        file: PathBuf,
    },
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Returns
/// `true` when the command succeeded; the process exits non-zero otherwise
pub async fn handle_command(command: Commands, config: &Config) -> Result<bool> {
    match command {
        Commands::Run { file, snapshots } => run::run_script(&file, snapshots, config).await,
        Commands::Validate { file } => validate::validate_script(&file, config),
        Commands::Plan { file } => plan::plan_script(&file, config),
    }
}
