//! Domain-specific error types and the failure policy table.
//!
//! Internal modules return typed errors (e.g., [`SyncError`], [`DeployError`])
//! while task and command boundaries convert them to [`anyhow::Error`] via
//! the standard `?` operator.
//!
//! # Error hierarchy
//!
//! ```text
//! PrerequisiteError: a required tool is missing and could not be installed
//! SyncError        : a repository could not be cloned
//! SyncWarning      : a best-effort git step failed after a prior clone
//! DeployError      : a config path could not be materialised
//! ToolchainError   : a language toolchain could not be installed
//! TaskError        : registry and installer bookkeeping
//! ```

use std::path::PathBuf;

use thiserror::Error;

/// A prerequisite tool is missing and could not be installed.
#[derive(Error, Debug)]
pub enum PrerequisiteError {
    /// The tool is not on PATH and no install route succeeded.
    #[error("missing prerequisite '{tool}': {reason}")]
    Missing {
        /// Program name that was looked up on PATH.
        tool: String,
        /// Why it could not be provided.
        reason: String,
    },
}

/// Errors that abort synchronisation of a single repository.
#[derive(Error, Debug)]
pub enum SyncError {
    /// The initial clone failed (network, auth, disk, occupied path).
    #[error("failed to clone '{name}' from {url}: {reason}")]
    CloneFailed {
        /// Short repository name.
        name: String,
        /// Remote URL that was cloned.
        url: String,
        /// Underlying failure description.
        reason: String,
    },
}

/// A non-fatal failure during reconciliation of an existing repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncWarning {
    /// Fetching remote refs failed; the local copy may be stale.
    #[error("fetch failed: {0}")]
    Fetch(String),
    /// The dirty-state query failed.
    #[error("status query failed: {0}")]
    Status(String),
    /// Resetting to the remote default branch failed.
    #[error("reset to {target} failed: {reason}")]
    Reset {
        /// Ref the reset targeted.
        target: String,
        /// Underlying failure description.
        reason: String,
    },
    /// Removing untracked and ignored files failed.
    #[error("clean failed: {0}")]
    Clean(String),
    /// Nested sub-repository update failed.
    #[error("submodule update failed: {0}")]
    Submodules(String),
}

/// Errors that abort a single deploy call.
#[derive(Error, Debug)]
pub enum DeployError {
    /// The deploy source does not exist.
    #[error("deploy source missing: {}", .0.display())]
    SourceMissing(PathBuf),
    /// The destination's parent directory could not be created.
    #[error("destination not writable: {}: {source}", .path.display())]
    DestUnwritable {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// An I/O failure while replacing the destination.
    #[error("{context}: {source}")]
    Io {
        /// What was being done.
        context: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A failure reported by a lower-level file helper.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeployError {
    /// Wrap an I/O error with a short description of the failed step.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// A language toolchain could not be installed.
#[derive(Error, Debug)]
pub enum ToolchainError {
    /// Package install or post-install step failed.
    #[error("toolchain '{name}' install failed: {reason}")]
    InstallFailed {
        /// Toolchain name.
        name: String,
        /// Underlying failure description.
        reason: String,
    },
}

/// Errors that arise from installer bookkeeping.
#[derive(Error, Debug)]
pub enum TaskError {
    /// A module kind or language has no installer mapped to it.
    #[error("no installer registered for '{0}'")]
    Unmapped(String),
    /// Two menu entries share the same label.
    #[error("duplicate menu label '{0}'")]
    DuplicateLabel(String),
}

/// How a failure of a given operation kind is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the enclosing unit of work.
    Fatal,
    /// Log a warning and continue with best-effort state.
    Warn,
    /// Discard silently.
    Ignore,
}

/// Every operation whose failure handling is decided by [`policy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// Locating or installing git, the package helper, or the prompt tool.
    Prerequisite,
    /// First clone of a repository with no local copy.
    Clone,
    /// Fetching refs of an existing repository.
    Fetch,
    /// Querying dirty state of an existing repository.
    StatusQuery,
    /// Asking the remote for its default branch.
    DefaultBranchQuery,
    /// Hard reset to the remote default branch.
    Reset,
    /// Removing untracked and ignored files.
    Clean,
    /// Recursive submodule update.
    SubmoduleUpdate,
    /// Removing a legacy install location before deploying.
    LegacyPurge,
    /// Linking or copying configuration into place.
    Deploy,
    /// Building a companion binary from a synced tree.
    Build,
    /// Removing a conflicting packaged build.
    ConflictRemoval,
    /// Installing a language toolchain.
    ToolchainInstall,
    /// Installing an editor extension.
    ExtensionInstall,
    /// Appending lines to a shell rc file.
    ShellRcAppend,
    /// Writing the palette override record.
    PaletteWrite,
    /// Deleting a scoped temporary directory.
    TempCleanup,
}

/// Failure policy for an operation kind.
///
/// `Fatal` aborts the enclosing unit only: prerequisites abort the run,
/// a failed clone or deploy aborts that module's installer. Failed
/// default-branch queries fall through to the next candidate.
#[must_use]
pub const fn policy(kind: OperationKind) -> FailurePolicy {
    match kind {
        OperationKind::Prerequisite | OperationKind::Clone | OperationKind::Deploy => {
            FailurePolicy::Fatal
        }
        OperationKind::Fetch
        | OperationKind::StatusQuery
        | OperationKind::Reset
        | OperationKind::Clean
        | OperationKind::SubmoduleUpdate
        | OperationKind::LegacyPurge
        | OperationKind::Build
        | OperationKind::ConflictRemoval
        | OperationKind::ToolchainInstall
        | OperationKind::ExtensionInstall
        | OperationKind::ShellRcAppend
        | OperationKind::PaletteWrite => FailurePolicy::Warn,
        OperationKind::DefaultBranchQuery | OperationKind::TempCleanup => FailurePolicy::Ignore,
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn prerequisite_missing_display() {
        let e = PrerequisiteError::Missing {
            tool: "gum".to_string(),
            reason: "paru -S gum failed".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "missing prerequisite 'gum': paru -S gum failed"
        );
    }

    #[test]
    fn clone_failed_display() {
        let e = SyncError::CloneFailed {
            name: "shell".to_string(),
            url: "https://example.invalid/shell.git".to_string(),
            reason: "could not resolve host".to_string(),
        };
        assert!(e.to_string().contains("failed to clone 'shell'"));
        assert!(e.to_string().contains("could not resolve host"));
    }

    #[test]
    fn sync_warning_reset_display() {
        let w = SyncWarning::Reset {
            target: "origin/main".to_string(),
            reason: "unknown revision".to_string(),
        };
        assert_eq!(w.to_string(), "reset to origin/main failed: unknown revision");
    }

    #[test]
    fn deploy_source_missing_display() {
        let e = DeployError::SourceMissing(PathBuf::from("/repos/shell"));
        assert_eq!(e.to_string(), "deploy source missing: /repos/shell");
    }

    #[test]
    fn deploy_dest_unwritable_has_source() {
        use std::error::Error as StdError;
        let e = DeployError::DestUnwritable {
            path: PathBuf::from("/etc/nope"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert!(e.to_string().contains("/etc/nope"));
        assert!(e.source().is_some());
    }

    #[test]
    fn toolchain_install_failed_display() {
        let e = ToolchainError::InstallFailed {
            name: "rust".to_string(),
            reason: "rustup not found".to_string(),
        };
        assert_eq!(
            e.to_string(),
            "toolchain 'rust' install failed: rustup not found"
        );
    }

    #[test]
    fn policy_table_is_explicit_about_fatal_operations() {
        assert_eq!(policy(OperationKind::Prerequisite), FailurePolicy::Fatal);
        assert_eq!(policy(OperationKind::Clone), FailurePolicy::Fatal);
        assert_eq!(policy(OperationKind::Deploy), FailurePolicy::Fatal);
    }

    #[test]
    fn policy_table_warns_on_reconciliation_steps() {
        for kind in [
            OperationKind::Fetch,
            OperationKind::Reset,
            OperationKind::Clean,
            OperationKind::SubmoduleUpdate,
            OperationKind::LegacyPurge,
        ] {
            assert_eq!(policy(kind), FailurePolicy::Warn, "{kind:?}");
        }
    }

    #[test]
    fn policy_table_ignores_only_fallbacks_and_temp_cleanup() {
        assert_eq!(
            policy(OperationKind::DefaultBranchQuery),
            FailurePolicy::Ignore
        );
        assert_eq!(policy(OperationKind::TempCleanup), FailurePolicy::Ignore);
        assert_eq!(policy(OperationKind::PaletteWrite), FailurePolicy::Warn);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn all_error_types_are_send_sync() {
        assert_send_sync::<PrerequisiteError>();
        assert_send_sync::<SyncError>();
        assert_send_sync::<SyncWarning>();
        assert_send_sync::<DeployError>();
        assert_send_sync::<ToolchainError>();
        assert_send_sync::<TaskError>();
    }

    #[test]
    fn sync_error_converts_to_anyhow() {
        let e = SyncError::CloneFailed {
            name: "cli".to_string(),
            url: "u".to_string(),
            reason: "r".to_string(),
        };
        let _anyhow_err: anyhow::Error = e.into();
    }
}
