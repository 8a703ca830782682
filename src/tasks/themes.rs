//! Themes installer.

use anyhow::{Context as _, Result};

use super::helpers::sync_repository;
use super::{Context, Task, TaskResult};
use crate::config::repositories::THEMES;
use crate::resources::deploy::{DeployMode, Deployment};
use crate::resources::mirror::{CopyFilter, SCRIPT_EXTENSIONS};

/// File types a theme may ship besides scripts.
const THEME_DATA_EXTENSIONS: &[&str] = &[
    "json", "toml", "yaml", "yml", "ini", "conf", "css", "colors", "theme", "svg", "png",
];

/// Sync the theme collection and mirror it into the config root.
#[derive(Debug)]
pub struct InstallThemes;

impl InstallThemes {
    fn filter(keyword: &str) -> Result<CopyFilter> {
        let allowed: Vec<&str> = SCRIPT_EXTENSIONS
            .iter()
            .chain(THEME_DATA_EXTENSIONS)
            .copied()
            .collect();
        CopyFilter::new(&allowed).with_directive(keyword)
    }
}

impl Task for InstallThemes {
    fn name(&self) -> &'static str {
        "Themes"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let report = sync_repository(ctx, THEMES)?;
        let filter = Self::filter(&ctx.config.directive_keyword)?;
        let dest = ctx.config.config_root.join("dotsetup").join(THEMES);

        let outcome = Deployment::new(report.path, dest, DeployMode::FilteredCopy(filter))
            .apply()
            .context("mirror themes")?;
        ctx.log.info(&format!(
            "themes: {} written, {} unchanged, {} removed",
            outcome.copied, outcome.unchanged, outcome.pruned
        ));
        if outcome.stripped_lines > 0 {
            ctx.log.debug(&format!(
                "stripped {} unsupported directive line(s)",
                outcome.stripped_lines
            ));
        }
        Ok(TaskResult::Ok)
    }
}
