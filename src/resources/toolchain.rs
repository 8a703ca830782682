//! Language toolchain installation.
use super::package::PackageManager;
use crate::error::ToolchainError;
use crate::exec::Executor;

/// A command run after the packages are installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostInstall {
    /// Program to run.
    pub program: &'static str,
    /// Its arguments.
    pub args: &'static [&'static str],
}

/// Everything needed to provide one language toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolchainSpec {
    /// Display name.
    pub name: &'static str,
    /// Packages installed through the package helper.
    pub packages: &'static [&'static str],
    /// Optional setup step once the packages are present.
    pub post_install: Option<PostInstall>,
    /// Line appended to existing shell rc files.
    pub rc_line: &'static str,
}

/// Install the packages of `spec` and run its post-install step.
///
/// The package manager is invoked with `--needed`, so an already present
/// toolchain costs one no-op call.
///
/// # Errors
///
/// Returns [`ToolchainError::InstallFailed`] if either step fails.
pub fn install(
    executor: &dyn Executor,
    manager: PackageManager,
    spec: &ToolchainSpec,
) -> Result<(), ToolchainError> {
    let failed = |reason: String| ToolchainError::InstallFailed {
        name: spec.name.to_string(),
        reason,
    };
    manager
        .install(executor, spec.packages)
        .map_err(|e| failed(format!("{e:#}")))?;
    if let Some(post) = spec.post_install {
        executor
            .run(post.program, post.args)
            .map_err(|e| failed(format!("{}: {e:#}", post.program)))?;
    }
    Ok(())
}
