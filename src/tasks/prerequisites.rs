//! Prerequisite resolution: git, an AUR helper and the prompt tool.
//!
//! Runs before any installer. Every failure here is fatal for the whole
//! run, because nothing after it can work without these tools.
use anyhow::{Context as _, Result};

use super::Context;
use super::helpers::tolerate;
use crate::error::{OperationKind, PrerequisiteError};
use crate::resources::package::PackageManager;

/// AUR package that provides a prebuilt paru.
const PARU_BOOTSTRAP_URL: &str = "https://aur.archlinux.org/paru-bin.git";

/// Program that renders prompts.
pub const PROMPT_TOOL: &str = "gum";

fn missing(tool: &str, reason: impl Into<String>) -> PrerequisiteError {
    PrerequisiteError::Missing {
        tool: tool.to_string(),
        reason: reason.into(),
    }
}

/// Make sure git, an AUR helper and the prompt tool are installed.
///
/// Returns the AUR helper that later installs should use.
///
/// # Errors
///
/// Returns [`PrerequisiteError::Missing`] for the first tool that is
/// absent and could not be installed.
pub fn resolve(ctx: &Context) -> Result<PackageManager, PrerequisiteError> {
    ctx.log.stage("Prerequisites");
    ensure_git(ctx)?;
    let helper = ensure_helper(ctx)?;
    ensure_prompt_tool(ctx, helper)?;
    Ok(helper)
}

fn ensure_git(ctx: &Context) -> Result<(), PrerequisiteError> {
    if ctx.executor.which("git") {
        ctx.log.debug("prerequisite ok: git");
        return Ok(());
    }
    ctx.log.info("installing git");
    PackageManager::Pacman
        .install(&*ctx.executor, &["git"])
        .map_err(|e| missing("git", format!("{e:#}")))?;
    if ctx.executor.which("git") {
        Ok(())
    } else {
        Err(missing("git", "installed but not found on PATH"))
    }
}

fn ensure_helper(ctx: &Context) -> Result<PackageManager, PrerequisiteError> {
    if let Some(helper) = PackageManager::detect_helper(&*ctx.executor) {
        ctx.log.debug(&format!("prerequisite ok: {helper}"));
        return Ok(helper);
    }
    ctx.log.info("no AUR helper found; bootstrapping paru");
    bootstrap_paru(ctx).map_err(|e| missing("paru", format!("{e:#}")))?;
    PackageManager::detect_helper(&*ctx.executor)
        .ok_or_else(|| missing("paru", "built but not found on PATH"))
}

/// Build and install paru-bin from the AUR in a scoped temp directory.
fn bootstrap_paru(ctx: &Context) -> Result<()> {
    PackageManager::Pacman
        .install(&*ctx.executor, &["base-devel"])
        .context("install base-devel")?;

    let tmp = tempfile::Builder::new()
        .prefix("dotsetup-paru-")
        .tempdir()
        .context("create paru build directory")?;
    let build_dir = tmp.path().join("paru-bin");
    let build_dir_str = build_dir.to_string_lossy();

    ctx.log.debug("cloning paru-bin from AUR");
    ctx.executor
        .run("git", &["clone", PARU_BOOTSTRAP_URL, &*build_dir_str])
        .context("clone paru-bin from AUR")?;

    let jobs = std::thread::available_parallelism().map_or(4, std::num::NonZeroUsize::get);
    let makeflags = format!("-j{jobs}");
    ctx.log
        .debug(&format!("building with MAKEFLAGS={makeflags}"));
    ctx.executor
        .run_in_with_env(
            &build_dir,
            "makepkg",
            &["-si", "--noconfirm"],
            &[("MAKEFLAGS", makeflags.as_str())],
        )
        .context("build paru-bin")?;

    tolerate(
        ctx,
        OperationKind::TempCleanup,
        "remove paru build directory",
        tmp.close(),
    )?;
    Ok(())
}

fn ensure_prompt_tool(ctx: &Context, helper: PackageManager) -> Result<(), PrerequisiteError> {
    if ctx.executor.which(PROMPT_TOOL) {
        ctx.log.debug(&format!("prerequisite ok: {PROMPT_TOOL}"));
        return Ok(());
    }
    ctx.log.info(&format!("installing {PROMPT_TOOL}"));
    helper
        .install(&*ctx.executor, &[PROMPT_TOOL])
        .map_err(|e| missing(PROMPT_TOOL, format!("{e:#}")))?;
    if ctx.executor.which(PROMPT_TOOL) {
        Ok(())
    } else {
        Err(missing(PROMPT_TOOL, "installed but not found on PATH"))
    }
}
