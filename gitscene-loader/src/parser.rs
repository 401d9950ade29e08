//! Scenario document parser
//!
//! Parses YAML into a [`ScriptDocument`] and builds the core entity graph
//! and Command Sets from it. No validation beyond the document's own shape
//! happens here.

use anyhow::{Context, Result};
use gitscene_core::{Command, CommandSet, ExecutionContext, Remote, Repository, Script, User};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use crate::document::{RepoDocument, ScriptDocument};

/// Parse a script from YAML source
///
/// # Errors
/// Returns an error if:
/// - The YAML is invalid or does not match the document layout
/// - A repository declares two remotes with the same name
/// - The first `commands` entry has no `context`
///
/// # Example
/// ```
/// use gitscene_loader::load_script;
///
/// let source = r#"
/// id: demo
/// user:
///   alice: { name: Alice, email: alice@example.com }
/// repos:
///   upstream: { path: theirs, bare: true }
///   mine:
///     path: mine
///     user: alice
///     remotes:
///       - { name: origin, repo: upstream }
/// commands:
///   - context: upstream
///     script: git init --bare
///   - context: mine
///     script:
///       - git init
///       - git remote add origin {repo.remotes.origin.remote_path}
/// "#;
///
/// let script = load_script(source)?;
/// assert_eq!(script.id, "demo");
/// assert_eq!(script.command_sets.len(), 2);
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn load_script(source: &str) -> Result<Script> {
    let document: ScriptDocument =
        serde_yaml::from_str(source).context("Failed to parse script document")?;
    build_script(document)
}

/// Read and parse a script from a YAML file
pub fn load_script_file(path: impl AsRef<Path>) -> Result<Script> {
    let path = path.as_ref();
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script file: {}", path.display()))?;
    load_script(&source).with_context(|| format!("Failed to load script: {}", path.display()))
}

fn build_script(document: ScriptDocument) -> Result<Script> {
    let users = document
        .user
        .into_iter()
        .map(|(id, user)| {
            let user = User::new(id.clone(), user.name, user.email);
            (id, user)
        })
        .collect();

    let mut repos = BTreeMap::new();
    for (id, repo) in document.repos {
        let repository = build_repository(&id, repo)?;
        repos.insert(id, repository);
    }

    let mut command_sets = Vec::new();
    let mut current: Option<String> = None;
    for (index, entry) in document.commands.into_iter().enumerate() {
        // An empty context inherits like a missing one
        if let Some(context) = entry.context.filter(|c| !c.is_empty()) {
            current = Some(context);
        }
        let repo = current.clone().with_context(|| {
            format!("Command entry {} has no context and none to inherit", index)
        })?;

        let commands = entry
            .script
            .into_commands()
            .into_iter()
            .map(Command::new)
            .collect();
        command_sets.push(CommandSet::new(repo, commands));
    }

    debug!(
        "Loaded script '{}' with {} command set(s)",
        document.id,
        command_sets.len()
    );

    Ok(Script::new(
        document.id,
        ExecutionContext::from_parts(users, repos),
        command_sets,
    ))
}

fn build_repository(id: &str, document: RepoDocument) -> Result<Repository> {
    let mut remotes = BTreeMap::new();
    for remote in document.remotes {
        if remotes.contains_key(&remote.name) {
            anyhow::bail!("Repository '{}' declares remote '{}' twice", id, remote.name);
        }
        remotes.insert(remote.name.clone(), Remote::new(remote.name, remote.repo));
    }

    Ok(Repository {
        id: id.to_string(),
        path: document.path,
        bare: document.bare,
        user: document.user,
        remotes,
    })
}
