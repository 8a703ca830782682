//! Repository synchronisation: clone or reconcile a managed repository.
//!
//! After a successful sync the working tree equals the tip of the remote
//! default branch, with untracked and ignored files removed and nested
//! sub-repositories updated. A repository flagged to preserve local changes
//! that has a dirty working tree only gets its remote refs refreshed.
use std::path::{Path, PathBuf};

use crate::config::RepositorySpec;
use crate::error::{SyncError, SyncWarning};
use crate::git::VersionControl;

/// Branch tried when neither the remote nor the local checkout names one.
const FALLBACK_BRANCH: &str = "main";

/// What a sync did to the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// No local copy existed; a fresh clone was made.
    Cloned,
    /// Existing copy reset to the remote default branch.
    Updated,
    /// Dirty copy left as-is because local changes are preserved.
    PreservedLocal,
}

/// Result of [`sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncReport {
    /// Short repository name.
    pub name: String,
    /// Local working tree.
    pub path: PathBuf,
    /// Branch the tree was reset to, if one was resolved.
    pub branch: Option<String>,
    /// `HEAD` before the sync (`None` for a fresh clone).
    pub head_before: Option<String>,
    /// `HEAD` after the sync.
    pub head: Option<String>,
    /// What happened.
    pub outcome: SyncOutcome,
    /// Best-effort steps that failed.
    pub warnings: Vec<SyncWarning>,
}

impl SyncReport {
    /// Whether the tracked content may differ from before the sync.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.outcome == SyncOutcome::Cloned || self.head_before != self.head
    }

    /// Whether reconciliation was skipped to keep local edits.
    #[must_use]
    pub fn preserved_local(&self) -> bool {
        self.outcome == SyncOutcome::PreservedLocal
    }
}

/// Bring `<root>/<spec.name>` in line with `spec.url`.
///
/// # Errors
///
/// Returns [`SyncError::CloneFailed`] if no local copy exists and cloning
/// fails, or if the path is occupied by a non-empty directory that is not a
/// repository. Every failure after a local copy exists is reported as a
/// [`SyncWarning`] in the returned report instead.
pub fn sync(
    vcs: &dyn VersionControl,
    spec: &RepositorySpec,
    root: &Path,
) -> Result<SyncReport, SyncError> {
    let path = root.join(&spec.name);
    if vcs.is_repository(&path) {
        Ok(reconcile(vcs, spec, path))
    } else {
        clone_fresh(vcs, spec, path)
    }
}

fn clone_fresh(
    vcs: &dyn VersionControl,
    spec: &RepositorySpec,
    path: PathBuf,
) -> Result<SyncReport, SyncError> {
    let clone_failed = |reason: String| SyncError::CloneFailed {
        name: spec.name.clone(),
        url: spec.url.clone(),
        reason,
    };

    if occupied(&path) {
        return Err(clone_failed(format!(
            "{} exists and is not a repository",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| clone_failed(format!("create {}: {e}", parent.display())))?;
    }
    vcs.clone_recursive(&spec.url, &path)
        .map_err(|e| clone_failed(format!("{e:#}")))?;

    Ok(SyncReport {
        name: spec.name.clone(),
        branch: vcs.current_branch(&path),
        head_before: None,
        head: vcs.head(&path),
        path,
        outcome: SyncOutcome::Cloned,
        warnings: Vec::new(),
    })
}

/// A non-empty directory or any non-directory entry.
fn occupied(path: &Path) -> bool {
    match path.symlink_metadata() {
        Err(_) => false,
        Ok(meta) if meta.is_dir() => std::fs::read_dir(path)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(true),
        Ok(_) => true,
    }
}

fn reconcile(vcs: &dyn VersionControl, spec: &RepositorySpec, path: PathBuf) -> SyncReport {
    let mut warnings = Vec::new();
    let head_before = vcs.head(&path);

    if let Err(e) = vcs.fetch(&path) {
        warnings.push(SyncWarning::Fetch(format!("{e:#}")));
    }

    if spec.preserve_local_changes {
        let dirty = vcs.is_dirty(&path).unwrap_or_else(|e| {
            warnings.push(SyncWarning::Status(format!("{e:#}")));
            true
        });
        if dirty {
            return SyncReport {
                name: spec.name.clone(),
                branch: vcs.current_branch(&path),
                head: vcs.head(&path),
                head_before,
                path,
                outcome: SyncOutcome::PreservedLocal,
                warnings,
            };
        }
    }

    let branch = resolve_default_branch(vcs, &path);
    match &branch {
        Some(branch) => {
            if let Err(e) = vcs.reset_to_remote(&path, branch) {
                warnings.push(SyncWarning::Reset {
                    target: format!("origin/{branch}"),
                    reason: format!("{e:#}"),
                });
            }
        }
        None => warnings.push(SyncWarning::Reset {
            target: "origin/<default>".to_string(),
            reason: "no default branch could be resolved".to_string(),
        }),
    }
    if let Err(e) = vcs.clean_untracked(&path) {
        warnings.push(SyncWarning::Clean(format!("{e:#}")));
    }
    if let Err(e) = vcs.update_submodules(&path) {
        warnings.push(SyncWarning::Submodules(format!("{e:#}")));
    }

    SyncReport {
        name: spec.name.clone(),
        head: vcs.head(&path),
        head_before,
        branch,
        path,
        outcome: SyncOutcome::Updated,
        warnings,
    }
}

/// Pick the branch to reset to.
///
/// Order: the branch the remote reports as default, the currently checked
/// out branch, `main` when `origin/main` exists, then the local
/// `origin/HEAD` symref. A failed remote query falls through silently.
pub fn resolve_default_branch(vcs: &dyn VersionControl, path: &Path) -> Option<String> {
    if let Ok(Some(branch)) = vcs.remote_default_branch(path) {
        return Some(branch);
    }
    if let Some(branch) = vcs.current_branch(path) {
        return Some(branch);
    }
    if vcs.ref_exists(path, &format!("origin/{FALLBACK_BRANCH}")) {
        return Some(FALLBACK_BRANCH.to_string());
    }
    vcs.remote_head_branch(path)
}
