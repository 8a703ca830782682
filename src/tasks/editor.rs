//! Editor theme and marketplace extensions.

use anyhow::{Context as _, Result};

use super::helpers::{sync_repository, tolerate};
use super::{Context, Task, TaskResult};
use crate::config::repositories::EDITOR;
use crate::error::OperationKind;
use crate::resources::deploy::{DeployMode, Deployment};
use crate::resources::mirror::CopyFilter;
use crate::resources::vscode_extension::{
    VsCodeExtensionResource, find_code_command, get_installed_extensions,
};
use crate::resources::{Applicable as _, ResourceChange, ResourceState};

/// File types that make up an editor theme extension.
const EXTENSION_FILE_TYPES: &[&str] = &["json", "md", "png", "svg", "woff", "woff2"];

/// Install folder of the theme extension under `~/.vscode/extensions`.
const EXTENSION_DIR: &str = "dotsetup.theme";

/// Sync the editor theme, mirror it into the extensions folder and install
/// the configured marketplace extensions.
#[derive(Debug)]
pub struct InstallEditor;

impl InstallEditor {
    fn install_extensions(ctx: &Context) -> Result<()> {
        if ctx.config.editor_extensions.is_empty() {
            return Ok(());
        }
        let Some(code) = find_code_command(&*ctx.executor) else {
            ctx.log
                .warn("editor CLI not found; marketplace extensions not installed");
            return Ok(());
        };
        let installed = get_installed_extensions(&code, &*ctx.executor)?;

        for id in &ctx.config.editor_extensions {
            let resource = VsCodeExtensionResource::new(id.clone(), code.clone(), &*ctx.executor);
            if resource.state_from_installed(&installed) == ResourceState::Correct {
                ctx.log.debug(&format!("extension {id} already installed"));
                continue;
            }
            match tolerate(
                ctx,
                OperationKind::ExtensionInstall,
                &format!("install extension {id}"),
                resource.apply(),
            )? {
                Some(ResourceChange::Applied) => {
                    ctx.log.info(&format!("installed extension {id}"));
                }
                Some(ResourceChange::Skipped { reason }) => {
                    ctx.log.warn(&format!("extension {id}: {reason}"));
                }
                Some(ResourceChange::AlreadyCorrect) | None => {}
            }
        }
        Ok(())
    }
}

impl Task for InstallEditor {
    fn name(&self) -> &'static str {
        "Editor"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let report = sync_repository(ctx, EDITOR)?;
        let dest = ctx
            .home()
            .join(".vscode/extensions")
            .join(EXTENSION_DIR);
        let filter = CopyFilter::new(EXTENSION_FILE_TYPES);

        let outcome = Deployment::new(report.path, dest, DeployMode::FilteredCopy(filter))
            .apply()
            .context("mirror editor theme")?;
        if outcome.changed() {
            ctx.log.info(&format!(
                "editor theme: {} written, {} removed",
                outcome.copied, outcome.pruned
            ));
        } else {
            ctx.log.debug("editor theme already current");
        }

        Self::install_extensions(ctx)?;
        Ok(TaskResult::Ok)
    }
}
