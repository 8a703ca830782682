//! Helpers shared by the module installers.
//!
//! - Repository synchronisation with warning reporting
//! - Failure policy application
//! - Shell rc line management

use anyhow::{Context as _, Result};

use super::Context;
use crate::error::{FailurePolicy, OperationKind, policy};
use crate::resources::repository::{self, SyncOutcome, SyncReport};
use crate::resources::shell_rc::{RC_FILES, ShellRcLine};
use crate::resources::{Applicable as _, ResourceChange};

/// Synchronise the managed repository `name` and log what happened.
///
/// Every [`SyncWarning`](crate::error::SyncWarning) is logged; the report
/// is returned so the caller can decide whether a rebuild is due.
///
/// # Errors
///
/// Returns an error if `name` is not a configured repository or the
/// initial clone fails.
pub fn sync_repository(ctx: &Context, name: &str) -> Result<SyncReport> {
    let spec = ctx
        .config
        .repository(name)
        .with_context(|| format!("repository '{name}' is not configured"))?;
    ctx.log
        .debug(&format!("syncing {name} from {}", spec.url));
    let report = repository::sync(&*ctx.vcs, spec, &ctx.config.repos_root)?;

    for warning in &report.warnings {
        ctx.log.warn(&format!("{name}: {warning}"));
    }
    match report.outcome {
        SyncOutcome::Cloned => ctx
            .log
            .info(&format!("cloned {name} into {}", report.path.display())),
        SyncOutcome::Updated if report.changed() => ctx.log.info(&format!(
            "updated {name} to {}",
            report.branch.as_deref().unwrap_or("remote head")
        )),
        SyncOutcome::Updated => ctx.log.debug(&format!("{name} already up to date")),
        SyncOutcome::PreservedLocal => ctx.log.warn(&format!(
            "{name} has local changes; kept them and only refreshed remote refs"
        )),
    }
    Ok(report)
}

/// Apply the failure policy of `kind` to `result`.
///
/// Returns `Ok(Some(value))` on success and `Ok(None)` when a failure is
/// tolerated (after logging it at the level the policy asks for).
///
/// # Errors
///
/// Propagates the failure when the policy is [`FailurePolicy::Fatal`].
pub fn tolerate<T, E>(
    ctx: &Context,
    kind: OperationKind,
    what: &str,
    result: std::result::Result<T, E>,
) -> Result<Option<T>>
where
    E: Into<anyhow::Error>,
{
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            let e: anyhow::Error = e.into();
            match policy(kind) {
                FailurePolicy::Fatal => Err(e.context(what.to_string())),
                FailurePolicy::Warn => {
                    ctx.log.warn(&format!("{what}: {e:#}"));
                    Ok(None)
                }
                FailurePolicy::Ignore => {
                    ctx.log.debug(&format!("{what}: {e:#}"));
                    Ok(None)
                }
            }
        }
    }
}

/// Append `line` to every existing shell rc file that lacks it.
///
/// Returns how many files were changed. Absent rc files are left absent.
pub fn append_rc_line(ctx: &Context, line: &str) -> Result<usize> {
    let mut appended = 0;
    for rc in RC_FILES {
        let resource = ShellRcLine::new(ctx.home().join(rc), line.to_string());
        let outcome = tolerate(
            ctx,
            OperationKind::ShellRcAppend,
            &format!("append to {rc}"),
            resource.apply(),
        )?;
        match outcome {
            Some(ResourceChange::Applied) => {
                ctx.log.info(&format!("added to {rc}: {line}"));
                appended += 1;
            }
            Some(ResourceChange::AlreadyCorrect) => {
                ctx.log.debug(&format!("{rc} already has: {line}"));
            }
            Some(ResourceChange::Skipped { reason }) => ctx.log.debug(&reason),
            None => {}
        }
    }
    Ok(appended)
}

/// Whether any candidate rc file exists in the home directory.
#[must_use]
pub fn any_rc_file(ctx: &Context) -> bool {
    RC_FILES.iter().any(|rc| ctx.home().join(rc).is_file())
}
