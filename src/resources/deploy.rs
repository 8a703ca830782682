//! Config deployment: materialise a synced source at a destination path.
use std::path::PathBuf;

use super::helpers::fs::remove_any;
use super::mirror::{self, CopyFilter};
use super::symlink::SymlinkResource;
use super::{Applicable as _, ResourceChange};
use crate::error::DeployError;

/// How a source is materialised at its destination.
#[derive(Debug, Clone)]
pub enum DeployMode {
    /// Destination becomes a symbolic link to the source.
    Link,
    /// Destination becomes a real directory mirroring the allowed files.
    FilteredCopy(CopyFilter),
}

/// What a single [`Deployment::apply`] did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployReport {
    /// Legacy paths that existed and were removed.
    pub purged: Vec<PathBuf>,
    /// A link was created or replaced.
    pub linked: bool,
    /// Files written by a filtered copy.
    pub copied: usize,
    /// Files a filtered copy found already up to date.
    pub unchanged: usize,
    /// Destination entries a filtered copy deleted.
    pub pruned: usize,
    /// Directive lines removed by a filtered copy.
    pub stripped_lines: usize,
    /// Non-fatal problems (legacy paths that could not be removed).
    pub warnings: Vec<String>,
}

impl DeployReport {
    /// Whether the destination was modified.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.linked || self.copied > 0 || self.pruned > 0
    }
}

/// A destination path owned by this program and the source it mirrors.
#[derive(Debug, Clone)]
pub struct Deployment {
    source: PathBuf,
    dest: PathBuf,
    mode: DeployMode,
    legacy_paths: Vec<PathBuf>,
}

impl Deployment {
    /// Deploy `source` to `dest` using `mode`.
    #[must_use]
    pub const fn new(source: PathBuf, dest: PathBuf, mode: DeployMode) -> Self {
        Self {
            source,
            dest,
            mode,
            legacy_paths: Vec::new(),
        }
    }

    /// Former install locations to delete before deploying.
    #[must_use]
    pub fn with_legacy_paths(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.legacy_paths.extend(paths);
        self
    }

    /// Destination path.
    #[must_use]
    pub const fn dest(&self) -> &PathBuf {
        &self.dest
    }

    /// Replace the destination with content derived from the source.
    ///
    /// The source is checked before anything is removed, so a missing
    /// source never costs the user their current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DeployError::SourceMissing`] if the source does not exist,
    /// [`DeployError::DestUnwritable`] if the destination's parent cannot be
    /// created, and [`DeployError::Other`] if replacing the destination fails.
    pub fn apply(&self) -> Result<DeployReport, DeployError> {
        if !self.source.exists() {
            return Err(DeployError::SourceMissing(self.source.clone()));
        }
        if let Some(parent) = self.dest.parent() {
            std::fs::create_dir_all(parent).map_err(|source| DeployError::DestUnwritable {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut report = DeployReport::default();
        for legacy in &self.legacy_paths {
            if *legacy == self.dest {
                continue;
            }
            match remove_any(legacy) {
                Ok(true) => report.purged.push(legacy.clone()),
                Ok(false) => {}
                Err(e) => report
                    .warnings
                    .push(format!("could not remove {}: {e:#}", legacy.display())),
            }
        }

        match &self.mode {
            DeployMode::Link => {
                let link = SymlinkResource::new(self.source.clone(), self.dest.clone());
                report.linked = link.apply()? == ResourceChange::Applied;
            }
            DeployMode::FilteredCopy(filter) => {
                let stats = mirror::mirror(&self.source, &self.dest, filter)?;
                report.copied = stats.copied;
                report.unchanged = stats.unchanged;
                report.pruned = stats.pruned;
                report.stripped_lines = stats.stripped_lines;
            }
        }
        Ok(report)
    }
}
