//! Plan command handler
//!
//! Formats every command without touching the filesystem.

use anyhow::{Context, Result};
use colored::*;
use std::path::Path;

use crate::config::Config;

/// Stand-in workspace for commands that reference paths
const PLACEHOLDER_WORKSPACE: &str = "<workspace>";

/// Print each command of a scenario as it would run
pub fn plan_script(file: &Path, config: &Config) -> Result<bool> {
    let mut script = gitscene_loader::load_script_file(file)?;

    let planned = script
        .plan(Path::new(PLACEHOLDER_WORKSPACE))
        .with_context(|| format!("Script '{}' is invalid", script.id))?;

    let formattable = planned.iter().all(|p| p.formatted.is_ok());

    if config.json {
        let entries: Vec<serde_json::Value> = planned
            .iter()
            .map(|p| match &p.formatted {
                Ok(command) => serde_json::json!({
                    "repo": p.repo,
                    "template": p.template,
                    "command": command,
                }),
                Err(e) => serde_json::json!({
                    "repo": p.repo,
                    "template": p.template,
                    "error": e.to_string(),
                }),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        println!(
            "{}",
            format!("Plan for '{}' ({} command(s)):", script.id, planned.len()).bold()
        );
        for p in &planned {
            match &p.formatted {
                Ok(command) => println!("  [{}] {}", p.repo.cyan(), command),
                Err(e) => println!(
                    "  [{}] {} {}",
                    p.repo.cyan(),
                    p.template.dimmed(),
                    e.to_string().red()
                ),
            }
        }
    }

    Ok(formattable)
}
