//! Companion binaries built from synced source trees.
use anyhow::{Context as _, Result};

use super::helpers::{sync_repository, tolerate};
use super::{Context, Task, TaskResult};
use crate::config::repositories::{BuildSpec, CLI, SETTINGS};
use crate::error::OperationKind;
use crate::resources::Applicable as _;
use crate::resources::package::{PackageResource, get_installed_packages};

/// Sync a repository that ships a Rust binary and install it from source.
///
/// The binary is rebuilt when the sync moved the tree or the installed
/// binary is missing; packaged builds that would shadow it are removed
/// first.
#[derive(Debug)]
pub struct BuildCompanion {
    label: &'static str,
    repository: &'static str,
}

impl BuildCompanion {
    /// The companion command-line tool.
    #[must_use]
    pub const fn cli() -> Self {
        Self {
            label: "Companion CLI",
            repository: CLI,
        }
    }

    /// The settings application.
    #[must_use]
    pub const fn settings() -> Self {
        Self {
            label: "Settings app",
            repository: SETTINGS,
        }
    }

    fn remove_conflicts(&self, ctx: &Context, build: &BuildSpec) -> Result<()> {
        if build.conflicts.is_empty() {
            return Ok(());
        }
        let installed = get_installed_packages(&*ctx.executor)?;
        let manager = ctx.package_manager();
        for name in build.conflicts.iter().filter(|n| installed.contains(*n)) {
            let package = PackageResource::new(name.clone(), manager, &*ctx.executor);
            if tolerate(
                ctx,
                OperationKind::ConflictRemoval,
                &format!("remove conflicting package {name}"),
                package.remove(),
            )?
            .is_some()
            {
                ctx.log.info(&format!("removed conflicting package {name}"));
            }
        }
        Ok(())
    }
}

impl Task for BuildCompanion {
    fn name(&self) -> &str {
        self.label
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let report = sync_repository(ctx, self.repository)?;
        let Some(build) = ctx
            .config
            .repository(self.repository)
            .and_then(|spec| spec.build.as_ref())
        else {
            return Ok(TaskResult::Ok);
        };

        self.remove_conflicts(ctx, build)?;

        if !report.path.join("Cargo.toml").is_file() {
            ctx.log
                .warn(&format!("{}: no Cargo.toml, nothing to build", self.repository));
            return Ok(TaskResult::Skipped("no Cargo.toml".to_string()));
        }
        if !ctx.executor.which("cargo") {
            ctx.log.warn("cargo not found on PATH");
            return Ok(TaskResult::Skipped("cargo not found".to_string()));
        }

        let binary = ctx.config.install_root.join("bin").join(&build.binary);
        if !report.changed() && binary.exists() {
            ctx.log
                .debug(&format!("{} is current", binary.display()));
            return Ok(TaskResult::Ok);
        }

        let source = report.path.to_string_lossy();
        let root = ctx.config.install_root.to_string_lossy();
        ctx.log.info(&format!("building {}", build.binary));
        let built = tolerate(
            ctx,
            OperationKind::Build,
            &format!("build {}", build.binary),
            ctx.executor
                .run(
                    "cargo",
                    &["install", "--path", &*source, "--root", &*root, "--force"],
                )
                .with_context(|| format!("cargo install {}", report.path.display())),
        )?;
        Ok(match built {
            Some(_) => {
                ctx.log
                    .info(&format!("installed {}", binary.display()));
                TaskResult::Ok
            }
            None => TaskResult::Skipped("build failed".to_string()),
        })
    }
}
