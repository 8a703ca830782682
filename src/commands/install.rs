//! The provisioning run: configuration, prerequisites, menus, summary.
use std::sync::Arc;

use anyhow::{Context as _, Result};

use crate::cli::{Cli, VERSION};
use crate::config::Config;
use crate::dispatch::{DispatchReport, Dispatcher, Mode};
use crate::exec::{Executor, SystemExecutor};
use crate::git::GitCli;
use crate::logging::{Log, Logger};
use crate::prompt::{GumPrompter, TextStyle};
use crate::tasks::registry::ModuleRegistry;
use crate::tasks::{Context, prerequisites};

/// Run the provisioner.
///
/// # Errors
///
/// Returns an error if configuration loading or prerequisite resolution
/// fails. Installer failures are only recorded in the summary.
pub fn run(cli: &Cli, log: &Arc<Logger>) -> Result<()> {
    log.info(&format!("dotsetup {VERSION}"));

    log.stage("Loading configuration");
    let config = Config::load(&cli.overrides())?;
    log.debug(&format!("repositories root: {}", config.repos_root.display()));
    log.debug(&format!("config root: {}", config.config_root.display()));
    log.info(&format!(
        "{} repositories, {} editor extensions",
        config.repositories.len(),
        config.editor_extensions.len()
    ));

    let executor: Arc<dyn Executor> = Arc::new(SystemExecutor);
    let ctx = Context::new(
        Arc::new(config),
        Arc::clone(log) as Arc<dyn Log>,
        Arc::clone(&executor),
        Arc::new(GitCli::new(Arc::clone(&executor))),
        Arc::new(GumPrompter::new(executor)),
    );

    let report = provision(ctx, &ModuleRegistry::standard(), cli.run_mode())?;
    log.debug(&format!(
        "dispatch finished: preset {:?}, {} modules, {} languages",
        report.preset,
        report.modules.len(),
        report.languages.len()
    ));

    log.print_summary();
    Ok(())
}

/// Validate the registry, resolve prerequisites and run the menus.
///
/// # Errors
///
/// Returns an error if the registry is inconsistent or a prerequisite is
/// missing. Nothing is prompted in either case.
pub fn provision(ctx: Context, registry: &ModuleRegistry, mode: Mode) -> Result<DispatchReport> {
    registry
        .validate()
        .context("installer registry is inconsistent")?;
    let helper = prerequisites::resolve(&ctx)?;
    ctx.log.debug(&format!("package helper: {helper}"));

    let ctx = ctx.with_interactive(mode == Mode::Interactive);
    if let Err(e) = ctx
        .prompt
        .styled(&format!("dotsetup {VERSION}"), TextStyle::Banner)
    {
        ctx.log.debug(&format!("banner not shown: {e:#}"));
    }
    Ok(Dispatcher::new(&ctx, registry).run(mode))
}
