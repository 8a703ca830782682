//! Programming-language toolchain installers.
use anyhow::Result;

use super::helpers::{append_rc_line, tolerate};
use super::registry::Language;
use super::{Context, Task, TaskResult};
use crate::error::OperationKind;
use crate::resources::toolchain::{self, PostInstall, ToolchainSpec};

const RUST: ToolchainSpec = ToolchainSpec {
    name: "Rust",
    packages: &["rustup"],
    post_install: Some(PostInstall {
        program: "rustup",
        args: &["default", "stable"],
    }),
    rc_line: r#"export PATH="$HOME/.cargo/bin:$PATH""#,
};

const NODE: ToolchainSpec = ToolchainSpec {
    name: "Node",
    packages: &["nvm"],
    // nvm is a shell function, so it needs a shell that sourced it
    post_install: Some(PostInstall {
        program: "bash",
        args: &[
            "-c",
            "source /usr/share/nvm/init-nvm.sh && nvm install --lts",
        ],
    }),
    rc_line: "source /usr/share/nvm/init-nvm.sh",
};

const GO: ToolchainSpec = ToolchainSpec {
    name: "Go",
    packages: &["go", "gopls"],
    post_install: None,
    rc_line: r#"export PATH="$HOME/go/bin:$PATH""#,
};

const PYTHON: ToolchainSpec = ToolchainSpec {
    name: "Python",
    packages: &["python", "python-pip", "python-pipx"],
    post_install: Some(PostInstall {
        program: "pipx",
        args: &["ensurepath"],
    }),
    rc_line: r#"export PATH="$HOME/.local/bin:$PATH""#,
};

/// Toolchain definition for `language`.
#[must_use]
pub const fn toolchain_for(language: Language) -> &'static ToolchainSpec {
    match language {
        Language::Rust => &RUST,
        Language::Node => &NODE,
        Language::Go => &GO,
        Language::Python => &PYTHON,
    }
}

/// Install one language toolchain and put its tools on PATH.
#[derive(Debug)]
pub struct InstallLanguage {
    spec: &'static ToolchainSpec,
}

impl InstallLanguage {
    /// Installer for `language`.
    #[must_use]
    pub const fn new(language: Language) -> Self {
        Self {
            spec: toolchain_for(language),
        }
    }
}

impl Task for InstallLanguage {
    fn name(&self) -> &str {
        self.spec.name
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let manager = ctx.package_manager();
        ctx.log.info(&format!(
            "installing {} via {manager}",
            self.spec.packages.join(" ")
        ));
        let installed = tolerate(
            ctx,
            OperationKind::ToolchainInstall,
            &format!("install {}", self.spec.name),
            toolchain::install(&*ctx.executor, manager, self.spec),
        )?;
        if installed.is_none() {
            return Ok(TaskResult::Skipped(format!(
                "{} toolchain install failed",
                self.spec.name
            )));
        }
        append_rc_line(ctx, self.spec.rc_line)?;
        Ok(TaskResult::Ok)
    }
}
