//! gitscene CLI
//!
//! Runs declarative git scenarios: users and repositories described in a
//! YAML document, commands executed against them in a fresh workspace.

mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use gitscene_core::FailurePolicy;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "gitscene")]
#[command(about = "Declarative git scenario runner", long_about = None)]
struct Cli {
    /// Directory new workspaces are created in
    #[arg(long, global = true, env = "GITSCENE_WORKSPACE_BASE")]
    workspace_base: Option<PathBuf>,

    /// Shell used to run commands
    #[arg(long, global = true, env = "GITSCENE_SHELL")]
    shell: Option<String>,

    /// Reaction to commands that cannot run (continue, abort-set, abort-script)
    #[arg(long, global = true, env = "GITSCENE_FAILURE_POLICY")]
    policy: Option<FailurePolicy>,

    /// Print machine-readable JSON instead of the human report
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "gitscene_cli=info,gitscene_runner=info,gitscene_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_args(cli.workspace_base, cli.shell, cli.policy, cli.json)?;

    if !handle_command(cli.command, &config).await? {
        std::process::exit(1);
    }

    Ok(())
}
