//! Configuration module
//!
//! Merges command-line flags over the runner defaults.

use anyhow::Result;
use gitscene_core::FailurePolicy;
use gitscene_runner::Config as RunnerConfig;
use std::path::PathBuf;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Settings handed to the execution service
    pub runner: RunnerConfig,

    /// Print JSON instead of the coloured report
    pub json: bool,
}

impl Config {
    /// Builds the configuration from parsed flags
    ///
    /// Flags already carry their environment fallbacks, so anything left
    /// unset keeps the runner default.
    pub fn from_args(
        workspace_base: Option<PathBuf>,
        shell: Option<String>,
        policy: Option<FailurePolicy>,
        json: bool,
    ) -> Result<Self> {
        let mut runner = RunnerConfig::default();

        if let Some(base) = workspace_base {
            runner.workspace_base = base;
        }
        if let Some(shell) = shell {
            runner.shell = shell;
        }
        if let Some(policy) = policy {
            runner.policy = policy;
        }

        runner.validate()?;

        Ok(Self { runner, json })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::from_args(None, None, None, false).unwrap();
        assert_eq!(config.runner.shell, "/bin/sh");
        assert_eq!(config.runner.policy, FailurePolicy::Continue);
        assert!(!config.json);
    }

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::from_args(
            Some(PathBuf::from("/var/tmp")),
            Some("/bin/bash".to_string()),
            Some(FailurePolicy::AbortSet),
            true,
        )
        .unwrap();

        assert_eq!(config.runner.workspace_base, PathBuf::from("/var/tmp"));
        assert_eq!(config.runner.shell, "/bin/bash");
        assert_eq!(config.runner.policy, FailurePolicy::AbortSet);
        assert!(config.json);
    }

    #[test]
    fn test_empty_shell_rejected() {
        assert!(Config::from_args(None, Some(" ".to_string()), None, false).is_err());
    }
}
