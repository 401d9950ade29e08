//! Runner configuration
//!
//! Defines where workspaces are allocated, which shell runs commands and
//! how failed commands affect the rest of a run.

use anyhow::{Context, Result};
use gitscene_core::FailurePolicy;
use std::path::PathBuf;

/// Default shell commands are handed to
pub const DEFAULT_SHELL: &str = "/bin/sh";

/// Runner configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory new workspaces are created in
    pub workspace_base: PathBuf,

    /// Shell used as `<shell> -c <command>`
    pub shell: String,

    /// What happens when a command cannot run
    pub policy: FailurePolicy,

    /// Record a git graph snapshot after every command
    pub snapshots: bool,
}

impl Config {
    /// Creates a new configuration with defaults
    pub fn new(workspace_base: PathBuf) -> Self {
        Self {
            workspace_base,
            shell: DEFAULT_SHELL.to_string(),
            policy: FailurePolicy::default(),
            snapshots: false,
        }
    }

    /// Creates configuration from environment variables
    ///
    /// Recognised environment variables:
    /// - GITSCENE_WORKSPACE_BASE (optional, default: system temp dir)
    /// - GITSCENE_SHELL (optional, default: /bin/sh)
    /// - GITSCENE_FAILURE_POLICY (optional, continue | abort-set | abort-script)
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(base) = lookup("GITSCENE_WORKSPACE_BASE").filter(|s| !s.is_empty()) {
            config.workspace_base = PathBuf::from(base);
        }

        if let Some(shell) = lookup("GITSCENE_SHELL").filter(|s| !s.is_empty()) {
            config.shell = shell;
        }

        if let Some(policy) = lookup("GITSCENE_FAILURE_POLICY").filter(|s| !s.is_empty()) {
            config.policy = policy
                .parse()
                .context("Invalid GITSCENE_FAILURE_POLICY")?;
        }

        Ok(config)
    }

    pub fn with_shell(mut self, shell: impl Into<String>) -> Self {
        self.shell = shell.into();
        self
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_snapshots(mut self, snapshots: bool) -> Self {
        self.snapshots = snapshots;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.shell.trim().is_empty() {
            anyhow::bail!("shell cannot be empty");
        }

        if self.workspace_base.as_os_str().is_empty() {
            anyhow::bail!("workspace_base cannot be empty");
        }

        if self.workspace_base.exists() && !self.workspace_base.is_dir() {
            anyhow::bail!(
                "workspace_base {} is not a directory",
                self.workspace_base.display()
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.shell, "/bin/sh");
        assert_eq!(config.policy, FailurePolicy::Continue);
        assert_eq!(config.workspace_base, std::env::temp_dir());
        assert!(!config.snapshots);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            ("GITSCENE_WORKSPACE_BASE", "/var/tmp/scenes"),
            ("GITSCENE_SHELL", "/bin/bash"),
            ("GITSCENE_FAILURE_POLICY", "abort-script"),
        ]))
        .unwrap();

        assert_eq!(config.workspace_base, PathBuf::from("/var/tmp/scenes"));
        assert_eq!(config.shell, "/bin/bash");
        assert_eq!(config.policy, FailurePolicy::AbortScript);
    }

    #[test]
    fn test_from_lookup_empty_values_use_defaults() {
        let config = Config::from_lookup(lookup(&[("GITSCENE_SHELL", "")])).unwrap();
        assert_eq!(config.shell, DEFAULT_SHELL);
    }

    #[test]
    fn test_from_lookup_invalid_policy() {
        let result = Config::from_lookup(lookup(&[("GITSCENE_FAILURE_POLICY", "maybe")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.shell = "  ".to_string();
        assert!(config.validate().is_err());

        config.shell = "/bin/sh".to_string();
        let file = tempfile::NamedTempFile::new().unwrap();
        config.workspace_base = file.path().to_path_buf();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = Config::new(PathBuf::from("/tmp"))
            .with_shell("/bin/bash")
            .with_policy(FailurePolicy::AbortSet)
            .with_snapshots(true);

        assert_eq!(config.shell, "/bin/bash");
        assert_eq!(config.policy, FailurePolicy::AbortSet);
        assert!(config.snapshots);
    }
}
