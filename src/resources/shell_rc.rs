//! Shell rc line resource.
use std::io::Write as _;
use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{Applicable, Resource, ResourceChange, ResourceState};

/// Candidate rc files relative to the home directory.
pub const RC_FILES: &[&str] = &[".bashrc", ".zshrc"];

/// A single line that must be present in an existing shell rc file.
///
/// Files that do not exist are never created: a user without zsh does not
/// get a `.zshrc`.
#[derive(Debug, Clone)]
pub struct ShellRcLine {
    /// The rc file.
    pub rc_file: PathBuf,
    /// Exact line content, without the trailing newline.
    pub line: String,
}

impl ShellRcLine {
    /// Create a new rc line resource.
    #[must_use]
    pub const fn new(rc_file: PathBuf, line: String) -> Self {
        Self { rc_file, line }
    }
}

impl Applicable for ShellRcLine {
    fn description(&self) -> String {
        format!("{}: {}", self.rc_file.display(), self.line)
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => return Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => return Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {}
        }
        let existing = std::fs::read_to_string(&self.rc_file)
            .with_context(|| format!("read {}", self.rc_file.display()))?;
        let mut file = std::fs::OpenOptions::new()
            .append(true)
            .open(&self.rc_file)
            .with_context(|| format!("open {}", self.rc_file.display()))?;
        let separator = if existing.is_empty() || existing.ends_with('\n') {
            ""
        } else {
            "\n"
        };
        write!(file, "{separator}{}\n", self.line)
            .with_context(|| format!("append to {}", self.rc_file.display()))?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for ShellRcLine {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.rc_file.is_file() {
            return Ok(ResourceState::Invalid {
                reason: format!("{} does not exist", self.rc_file.display()),
            });
        }
        let content = std::fs::read_to_string(&self.rc_file)
            .with_context(|| format!("read {}", self.rc_file.display()))?;
        Ok(if content.lines().any(|l| l.trim() == self.line.trim()) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }
}
