//! Palette override installer.

use anyhow::Result;

use super::helpers::tolerate;
use super::{Context, Task, TaskResult};
use crate::error::OperationKind;
use crate::resources::palette::{PaletteFile, PaletteOverride, parse_hex_color};
use crate::resources::{Applicable as _, ResourceChange};

/// Palette source name when no design app is installed.
pub const DEFAULT_SOURCE: &str = "default";

/// `(primary, secondary, tertiary)` used when no design app is found.
pub const DEFAULT_COLORS: (&str, &str, &str) = ("ff3e00", "312e81", "1f2937");

/// Known design apps, in detection order, with their accent palettes.
const DESIGN_APPS: &[(&str, (&str, &str, &str))] = &[
    ("figma-linux", ("a259ff", "0acf83", "1abcfe")),
    ("inkscape", ("3b82f6", "1e3a8a", "111827")),
    ("krita", ("3daee9", "31363b", "232629")),
    ("gimp", ("7c6f64", "5c5048", "282828")),
];

/// Write the colour palette override used by the desktop shell.
#[derive(Debug)]
pub struct WritePalette;

impl WritePalette {
    fn detect(ctx: &Context) -> PaletteOverride {
        DESIGN_APPS
            .iter()
            .find(|(app, _)| ctx.executor.which(app))
            .map_or_else(
                || {
                    let (p, s, t) = DEFAULT_COLORS;
                    PaletteOverride::new(DEFAULT_SOURCE, p, s, t)
                },
                |(app, (p, s, t))| PaletteOverride::new(app, p, s, t),
            )
    }

    fn ask_primary(ctx: &Context, palette: &mut PaletteOverride) -> Result<()> {
        let header = format!("Primary colour for {}", palette.active_language);
        let Some(answer) = ctx.prompt.input(&header, &palette.colors.primary)? else {
            return Ok(());
        };
        if answer.is_empty() {
            return Ok(());
        }
        match parse_hex_color(&answer) {
            Some(hex) => palette.set_primary(&hex),
            None => ctx
                .log
                .warn(&format!("'{answer}' is not a hex colour; keeping #{}", palette.colors.primary)),
        }
        Ok(())
    }
}

impl Task for WritePalette {
    fn name(&self) -> &'static str {
        "Palette"
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut palette = Self::detect(ctx);
        ctx.log
            .debug(&format!("palette source: {}", palette.active_language));
        if ctx.interactive && palette.active_language != DEFAULT_SOURCE {
            Self::ask_primary(ctx, &mut palette)?;
        }

        let file = PaletteFile {
            path: ctx.config.state_dir.join("palette.json"),
            palette,
        };
        let Some(change) = tolerate(
            ctx,
            OperationKind::PaletteWrite,
            &format!("write {}", file.path.display()),
            file.apply(),
        )?
        else {
            return Ok(TaskResult::Skipped("palette not written".to_string()));
        };
        if change == ResourceChange::Applied {
            ctx.log.info(&format!(
                "palette #{} from {} written",
                file.palette.colors.primary, file.palette.active_language
            ));
        } else {
            ctx.log.debug("palette already current");
        }
        Ok(TaskResult::Ok)
    }
}
