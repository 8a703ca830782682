//! Shell configuration installer.

use anyhow::{Context as _, Result};

use super::helpers::sync_repository;
use super::{Context, Task, TaskResult};
use crate::config::repositories::SHELL;
use crate::resources::deploy::{DeployMode, Deployment};

/// Directory under the config root that holds desktop shell configs.
const SHELL_CONFIG_DIR: &str = "quickshell";
/// Name of the linked config inside [`SHELL_CONFIG_DIR`].
const LINK_NAME: &str = "dotsetup";
/// Former names of the linked config.
const LEGACY_NAMES: &[&str] = &["dots", "shell"];

/// Sync the desktop shell configuration and link it into place.
#[derive(Debug)]
pub struct InstallShellConfig;

impl Task for InstallShellConfig {
    fn name(&self) -> &'static str {
        "Shell config"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let report = sync_repository(ctx, SHELL)?;

        let parent = ctx.config.config_root.join(SHELL_CONFIG_DIR);
        let dest = parent.join(LINK_NAME);
        if ctx.interactive {
            let question = format!("Link {} to {}?", dest.display(), report.path.display());
            if ctx.prompt.confirm(&question)? != Some(true) {
                return Ok(TaskResult::Skipped("linking declined".to_string()));
            }
        }

        let deployment = Deployment::new(report.path, dest, DeployMode::Link)
            .with_legacy_paths(LEGACY_NAMES.iter().map(|name| parent.join(name)));
        let outcome = deployment.apply().context("link shell config")?;

        for path in &outcome.purged {
            ctx.log
                .info(&format!("removed legacy config {}", path.display()));
        }
        for warning in &outcome.warnings {
            ctx.log.warn(warning);
        }
        if outcome.linked {
            ctx.log
                .info(&format!("linked {}", deployment.dest().display()));
        } else {
            ctx.log.debug("shell config link already correct");
        }
        Ok(TaskResult::Ok)
    }
}
