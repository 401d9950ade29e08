//! Validate command handler

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::config::Config;

/// Check that a scenario loads and its entity graph is consistent
pub fn validate_script(file: &Path, config: &Config) -> Result<bool> {
    let mut script = gitscene_loader::load_script_file(file)?;

    script
        .validate()
        .with_context(|| format!("Script '{}' is invalid", script.id))?;

    let commands: usize = script.command_sets.iter().map(|s| s.commands.len()).sum();

    if config.json {
        let summary = serde_json::json!({
            "id": script.id,
            "valid": true,
            "users": script.context.users.len(),
            "repos": script.context.repos.len(),
            "command_sets": script.command_sets.len(),
            "commands": commands,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "{}",
            format!("✓ Script '{}' is valid", script.id).green().bold()
        );
        println!("  Users:        {}", script.context.users.len());
        println!("  Repositories: {}", script.context.repos.len());
        println!(
            "  Commands:     {} in {} set(s)",
            commands,
            script.command_sets.len()
        );
    }

    Ok(true)
}
