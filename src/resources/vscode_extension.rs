//! Editor extension resource.
use std::collections::HashSet;

use anyhow::Result;

use super::{Applicable, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Editor CLIs that accept `--install-extension`, in order of preference.
const CODE_COMMANDS: &[&str] = &["code", "code-oss", "codium"];

/// A marketplace extension installed through the editor CLI.
#[derive(Debug)]
pub struct VsCodeExtensionResource<'a> {
    /// Extension identifier (`publisher.name`).
    pub id: String,
    /// Editor CLI to use.
    pub code_cmd: String,
    executor: &'a dyn Executor,
}

impl<'a> VsCodeExtensionResource<'a> {
    /// Create a new extension resource.
    #[must_use]
    pub const fn new(id: String, code_cmd: String, executor: &'a dyn Executor) -> Self {
        Self {
            id,
            code_cmd,
            executor,
        }
    }

    /// Determine the state from a pre-fetched set of installed IDs.
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.id.to_lowercase()) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

/// Query all installed extension IDs (lower-cased) in a single command.
///
/// # Errors
///
/// Returns an error if the editor CLI cannot be spawned.
pub fn get_installed_extensions(
    code_cmd: &str,
    executor: &dyn Executor,
) -> Result<HashSet<String>> {
    let result = executor.run_unchecked(code_cmd, &["--list-extensions"])?;
    let mut set = HashSet::new();
    if result.success {
        for line in result.stdout.lines() {
            let id = line.trim().to_lowercase();
            if !id.is_empty() {
                set.insert(id);
            }
        }
    }
    Ok(set)
}

impl Applicable for VsCodeExtensionResource<'_> {
    fn description(&self) -> String {
        self.id.clone()
    }

    fn apply(&self) -> Result<ResourceChange> {
        let result = self
            .executor
            .run_unchecked(&self.code_cmd, &["--install-extension", &self.id, "--force"])?;
        if result.success {
            Ok(ResourceChange::Applied)
        } else {
            Ok(ResourceChange::Skipped {
                reason: format!("failed to install: {}", result.stderr.trim()),
            })
        }
    }
}

/// Find the editor CLI on PATH.
#[must_use]
pub fn find_code_command(executor: &dyn Executor) -> Option<String> {
    CODE_COMMANDS
        .iter()
        .find(|cmd| executor.which(cmd))
        .map(|cmd| (*cmd).to_string())
}
