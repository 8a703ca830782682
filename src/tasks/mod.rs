//! Module installers and the machinery that runs them.
pub mod companion;
mod context;
pub mod editor;
mod helpers;
pub mod languages;
pub mod palette;
pub mod prerequisites;
pub mod registry;
pub mod shell_config;
pub mod shell_rc;
pub mod themes;

pub use context::Context;

use anyhow::Result;

use crate::logging::TaskStatus;

/// Result of a single installer execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResult {
    /// Installer completed.
    Ok,
    /// Installer chose not to act, with a reason.
    Skipped(String),
}

/// A named, executable installer.
pub trait Task: Send + Sync {
    /// Human-readable installer name.
    fn name(&self) -> &str;

    /// Whether this installer has anything to act on in this environment.
    fn should_run(&self, _ctx: &Context) -> bool {
        true
    }

    /// Execute the installer.
    ///
    /// # Errors
    ///
    /// Returns an error if a step whose failure is fatal to this installer
    /// fails (a clone, a deploy, a toolchain install).
    fn run(&self, ctx: &Context) -> Result<TaskResult>;
}

/// Execute an installer, recording the result in the logger.
///
/// Errors never propagate: they are logged as a single line and recorded
/// as [`TaskStatus::Failed`] so the caller can move on to the next
/// installer.
pub fn execute(task: &dyn Task, ctx: &Context) -> TaskStatus {
    if !task.should_run(ctx) {
        ctx.log
            .debug(&format!("skipping {}: not applicable", task.name()));
        ctx.log
            .record_task(task.name(), TaskStatus::Skipped, Some("not applicable"));
        return TaskStatus::Skipped;
    }

    ctx.log.stage(task.name());

    match task.run(ctx) {
        Ok(TaskResult::Ok) => {
            ctx.log.record_task(task.name(), TaskStatus::Ok, None);
            TaskStatus::Ok
        }
        Ok(TaskResult::Skipped(reason)) => {
            ctx.log.info(&format!("skipped: {reason}"));
            ctx.log
                .record_task(task.name(), TaskStatus::Skipped, Some(&reason));
            TaskStatus::Skipped
        }
        Err(e) => {
            ctx.log.error(&format!("{}: {e:#}", task.name()));
            ctx.log
                .record_task(task.name(), TaskStatus::Failed, Some(&format!("{e:#}")));
            TaskStatus::Failed
        }
    }
}
