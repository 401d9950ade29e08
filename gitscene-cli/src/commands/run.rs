//! Run command handler
//!
//! Executes a scenario and prints the result list.

use anyhow::{Context, Result};
use colored::*;
use gitscene_core::{CommandExecutionResult, ScriptResult};
use gitscene_runner::{ExecutionService, GitSnapshotHook, StandardExecutionService};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;

/// Load, execute and report a scenario
pub async fn run_script(file: &Path, snapshots: Option<PathBuf>, config: &Config) -> Result<bool> {
    let mut script = gitscene_loader::load_script_file(file)?;
    debug!(
        "Loaded script '{}' from {} ({} command set(s))",
        script.id,
        file.display(),
        script.command_sets.len()
    );

    let runner_config = config.runner.clone().with_snapshots(snapshots.is_some());
    let service = StandardExecutionService::new(runner_config);

    let result = service.execute(&mut script).await?;

    let written = match (&snapshots, service.snapshots()) {
        (Some(dir), Some(hook)) => write_snapshots(hook, dir)?,
        _ => Vec::new(),
    };

    if config.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_result(&result);
        if let Some(dir) = &snapshots {
            println!(
                "  {} snapshot(s) written to {}",
                written.len().to_string().cyan(),
                dir.display()
            );
        }
    }

    Ok(result.is_success())
}

/// Write every recorded snapshot below `dir`
fn write_snapshots(hook: &GitSnapshotHook, dir: &Path) -> Result<Vec<PathBuf>> {
    let written = hook
        .write_to(dir)
        .with_context(|| format!("Failed to write snapshots to {}", dir.display()))?;
    info!("Wrote {} snapshot(s) to {}", written.len(), dir.display());
    Ok(written)
}

fn print_result(result: &ScriptResult) {
    if result.is_success() {
        println!(
            "{}",
            format!("✓ Script '{}' completed", result.script_id)
                .green()
                .bold()
        );
    } else {
        println!(
            "{}",
            format!("✗ Script '{}' completed with failures", result.script_id)
                .red()
                .bold()
        );
    }
    println!("  Workspace: {}", result.workspace.display().to_string().cyan());
    println!("  Commands:  {}", result.results.len().to_string().dimmed());
    println!();

    for command in &result.results {
        print_command(command);
    }

    if !result.failures.is_empty() {
        println!("{}", "Commands that could not run:".red().bold());
        for failure in &result.failures {
            println!(
                "  [{}] #{} {}",
                failure.repo.cyan(),
                failure.command_index,
                failure.command.text().bold()
            );
            println!("      {}", failure.error.to_string().red());
        }
    }

    if result.halted {
        println!("{}", "Execution halted by failure policy.".yellow());
    }
}

fn print_command(command: &CommandExecutionResult) {
    let status = if command.success() {
        command.exit_code().to_string().green()
    } else {
        command.exit_code().to_string().red()
    };

    println!(
        "  {} {} {}",
        format!("[{}]", command.pwd()).cyan(),
        command.formatted_command().bold(),
        format!("-> {}", status).dimmed()
    );

    for line in command.stdout().lines() {
        println!("      {}", line);
    }
    for line in command.stderr().lines() {
        println!("      {}", line.dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gitscene_runner::ShellProcessRunner;
    use std::sync::Arc;

    #[test]
    fn test_write_snapshots_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("snaps");
        let hook = GitSnapshotHook::new(Arc::new(ShellProcessRunner::default()));

        let written = write_snapshots(&hook, &target).unwrap();
        assert!(written.is_empty());
        assert!(target.is_dir());
    }

    #[test]
    fn test_write_snapshots_reports_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("occupied");
        std::fs::write(&target, "file").unwrap();
        let hook = GitSnapshotHook::new(Arc::new(ShellProcessRunner::default()));

        let err = write_snapshots(&hook, &target).unwrap_err();
        assert!(err.to_string().contains("Failed to write snapshots"));
    }
}
