//! Symlink resource.
use anyhow::{Context as _, Result};
use std::path::PathBuf;

use super::helpers::fs::{ensure_parent_dir, path_present, remove_any};
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// A symlink at `target` pointing to `source`.
///
/// Applying replaces whatever occupies `target` (file, link, or a whole
/// directory tree); the previous content is discarded.
#[derive(Debug, Clone)]
pub struct SymlinkResource {
    /// The source file/directory (what the symlink points to).
    pub source: PathBuf,
    /// The target path (where the symlink will be created).
    pub target: PathBuf,
}

impl SymlinkResource {
    /// Create a new symlink resource.
    #[must_use]
    pub const fn new(source: PathBuf, target: PathBuf) -> Self {
        Self { source, target }
    }
}

impl Applicable for SymlinkResource {
    fn description(&self) -> String {
        format!("{} -> {}", self.target.display(), self.source.display())
    }

    fn apply(&self) -> Result<ResourceChange> {
        match self.current_state()? {
            ResourceState::Correct => return Ok(ResourceChange::AlreadyCorrect),
            ResourceState::Invalid { reason } => return Ok(ResourceChange::Skipped { reason }),
            ResourceState::Missing | ResourceState::Incorrect { .. } => {}
        }
        ensure_parent_dir(&self.target)?;
        remove_any(&self.target)
            .with_context(|| format!("remove existing: {}", self.target.display()))?;
        std::os::unix::fs::symlink(&self.source, &self.target).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                self.target.display(),
                self.source.display()
            )
        })?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for SymlinkResource {
    fn current_state(&self) -> Result<ResourceState> {
        if !self.source.exists() {
            return Ok(ResourceState::Invalid {
                reason: format!("source does not exist: {}", self.source.display()),
            });
        }

        if let Ok(existing) = std::fs::read_link(&self.target) {
            return Ok(if existing == self.source {
                ResourceState::Correct
            } else {
                ResourceState::Incorrect {
                    current: format!("points to {}", existing.display()),
                }
            });
        }

        if !path_present(&self.target) {
            return Ok(ResourceState::Missing);
        }
        let current = if self.target.is_dir() {
            "target is a real directory"
        } else {
            "target is a regular file"
        };
        Ok(ResourceState::Incorrect {
            current: current.to_string(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn symlink_resource_description() {
        let resource = SymlinkResource::new(PathBuf::from("/source"), PathBuf::from("/target"));
        assert_eq!(resource.description(), "/target -> /source");
    }

    #[test]
    fn invalid_when_source_missing() {
        let temp_dir = tempfile::tempdir().unwrap();
        let resource = SymlinkResource::new(
            temp_dir.path().join("nonexistent"),
            temp_dir.path().join("target"),
        );
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Invalid { .. }
        ));
    }

    #[test]
    fn missing_when_target_not_exists() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source");
        std::fs::write(&source, "test").unwrap();
        let resource = SymlinkResource::new(source, temp_dir.path().join("target"));
        assert_eq!(resource.current_state().unwrap(), ResourceState::Missing);
    }

    #[test]
    fn incorrect_when_link_points_elsewhere() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source");
        let other = temp_dir.path().join("other");
        let target = temp_dir.path().join("target");
        std::fs::write(&source, "test").unwrap();
        std::fs::write(&other, "other").unwrap();
        std::os::unix::fs::symlink(&other, &target).unwrap();

        let resource = SymlinkResource::new(source, target);
        assert!(matches!(
            resource.current_state().unwrap(),
            ResourceState::Incorrect { .. }
        ));
    }

    #[test]
    fn apply_replaces_real_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("repo");
        let target = temp_dir.path().join("config/app");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("shell.qml"), "Item {}").unwrap();
        std::fs::create_dir_all(target.join("old")).unwrap();
        std::fs::write(target.join("old/stale.qml"), "stale").unwrap();

        let resource = SymlinkResource::new(source.clone(), target.clone());
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(std::fs::read_link(&target).unwrap(), source);
        assert!(target.join("shell.qml").exists());
        assert!(!source.join("old").exists());
    }

    #[test]
    fn apply_is_noop_when_already_linked() {
        let temp_dir = tempfile::tempdir().unwrap();
        let source = temp_dir.path().join("source");
        let target = temp_dir.path().join("target");
        std::fs::create_dir(&source).unwrap();

        let resource = SymlinkResource::new(source, target);
        assert_eq!(resource.apply().unwrap(), ResourceChange::Applied);
        assert_eq!(resource.apply().unwrap(), ResourceChange::AlreadyCorrect);
    }
}
