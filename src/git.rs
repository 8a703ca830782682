//! Version-control capability used by the repository synchronizer.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::exec::{ExecResult, Executor};

/// Environment applied to every git invocation so that a missing credential
/// fails fast instead of blocking on a terminal prompt.
const GIT_ENV: &[(&str, &str)] = &[("GIT_TERMINAL_PROMPT", "0")];

/// Operations the synchronizer needs from a version-control tool.
///
/// Paths are the working tree of a single repository except for
/// [`clone_recursive`](Self::clone_recursive), whose `dest` must not exist
/// or be empty.
#[cfg_attr(test, mockall::automock)]
pub trait VersionControl: Send + Sync {
    /// Whether `path` holds repository metadata.
    fn is_repository(&self, path: &Path) -> bool;

    /// Clone `url` into `dest`, including nested sub-repositories.
    ///
    /// # Errors
    ///
    /// Returns an error if git exits non-zero.
    fn clone_recursive(&self, url: &str, dest: &Path) -> Result<()>;

    /// Fetch all remotes, pruning deleted refs and updating tags.
    ///
    /// # Errors
    ///
    /// Returns an error if git exits non-zero.
    fn fetch(&self, path: &Path) -> Result<()>;

    /// Branch the remote reports as its default (`HEAD` symref).
    ///
    /// # Errors
    ///
    /// Returns an error if the remote cannot be queried.
    fn remote_default_branch(&self, path: &Path) -> Result<Option<String>>;

    /// Branch recorded by the local `origin/HEAD` symbolic ref.
    fn remote_head_branch(&self, path: &Path) -> Option<String>;

    /// Currently checked-out branch, `None` when detached.
    fn current_branch(&self, path: &Path) -> Option<String>;

    /// Whether the working tree has modified, staged or untracked files.
    ///
    /// # Errors
    ///
    /// Returns an error if the status query fails.
    fn is_dirty(&self, path: &Path) -> Result<bool>;

    /// Whether `reference` resolves to a commit.
    fn ref_exists(&self, path: &Path, reference: &str) -> bool;

    /// Force `branch` to `origin/<branch>`, check it out and hard-reset the
    /// working tree to it.
    ///
    /// # Errors
    ///
    /// Returns an error if checkout or reset fails.
    fn reset_to_remote(&self, path: &Path, branch: &str) -> Result<()>;

    /// Remove untracked and ignored files.
    ///
    /// # Errors
    ///
    /// Returns an error if git exits non-zero.
    fn clean_untracked(&self, path: &Path) -> Result<()>;

    /// Initialise and force-update nested sub-repositories recursively.
    ///
    /// # Errors
    ///
    /// Returns an error if git exits non-zero.
    fn update_submodules(&self, path: &Path) -> Result<()>;

    /// Commit id of `HEAD`, `None` for an unborn branch.
    fn head(&self, path: &Path) -> Option<String>;
}

/// [`VersionControl`] backed by the `git` command line.
pub struct GitCli {
    executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for GitCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitCli").finish_non_exhaustive()
    }
}

impl GitCli {
    /// Create a git backend running commands through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    fn git(&self, dir: &Path, args: &[&str]) -> Result<ExecResult> {
        self.executor.run_in_with_env(dir, "git", args, GIT_ENV)
    }

    /// Run a local query and return trimmed stdout on success.
    fn query(&self, dir: &Path, args: &[&str]) -> Option<String> {
        let result = self.executor.run_in_unchecked(dir, "git", args).ok()?;
        let out = result.stdout.trim();
        (result.success && !out.is_empty()).then(|| out.to_string())
    }
}

/// Extract the branch name from `git ls-remote --symref origin HEAD` output.
///
/// The relevant line has the form `ref: refs/heads/<branch>\tHEAD`.
pub(crate) fn parse_symref(output: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let (target, name) = line.strip_prefix("ref:")?.trim().split_once('\t')?;
        if name.trim() != "HEAD" {
            return None;
        }
        target
            .trim()
            .strip_prefix("refs/heads/")
            .map(str::to_string)
    })
}

impl VersionControl for GitCli {
    fn is_repository(&self, path: &Path) -> bool {
        path.join(".git").exists()
    }

    fn clone_recursive(&self, url: &str, dest: &Path) -> Result<()> {
        let parent = dest
            .parent()
            .with_context(|| format!("{} has no parent directory", dest.display()))?;
        let dest_str = dest.to_string_lossy();
        self.git(parent, &["clone", "--recurse-submodules", url, &dest_str])?;
        Ok(())
    }

    fn fetch(&self, path: &Path) -> Result<()> {
        self.git(path, &["fetch", "--all", "--prune", "--tags", "--force"])?;
        Ok(())
    }

    fn remote_default_branch(&self, path: &Path) -> Result<Option<String>> {
        let result = self.git(path, &["ls-remote", "--symref", "origin", "HEAD"])?;
        Ok(parse_symref(&result.stdout))
    }

    fn remote_head_branch(&self, path: &Path) -> Option<String> {
        let full = self.query(path, &["symbolic-ref", "--short", "refs/remotes/origin/HEAD"])?;
        full.strip_prefix("origin/").map(str::to_string)
    }

    fn current_branch(&self, path: &Path) -> Option<String> {
        self.query(path, &["symbolic-ref", "--short", "-q", "HEAD"])
    }

    fn is_dirty(&self, path: &Path) -> Result<bool> {
        let result = self.git(path, &["status", "--porcelain", "--untracked-files=normal"])?;
        Ok(!result.stdout.trim().is_empty())
    }

    fn ref_exists(&self, path: &Path, reference: &str) -> bool {
        let spec = format!("{reference}^{{commit}}");
        self.executor
            .run_in_unchecked(path, "git", &["rev-parse", "--verify", "--quiet", &spec])
            .is_ok_and(|r| r.success)
    }

    fn reset_to_remote(&self, path: &Path, branch: &str) -> Result<()> {
        let target = format!("origin/{branch}");
        self.git(path, &["checkout", "-f", "-B", branch, &target])?;
        self.git(path, &["reset", "--hard", &target])?;
        Ok(())
    }

    fn clean_untracked(&self, path: &Path) -> Result<()> {
        self.git(path, &["clean", "-ffdx"])?;
        Ok(())
    }

    fn update_submodules(&self, path: &Path) -> Result<()> {
        self.git(
            path,
            &["submodule", "update", "--init", "--recursive", "--force"],
        )?;
        Ok(())
    }

    fn head(&self, path: &Path) -> Option<String> {
        self.query(path, &["rev-parse", "--verify", "-q", "HEAD"])
    }
}
