//! Palette override record.
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};

use super::helpers::fs::write_atomic;
use super::{Applicable, Resource, ResourceChange, ResourceState};

/// Accent colours as hex strings without a leading `#`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteColors {
    /// Main accent.
    pub primary: String,
    /// Secondary accent.
    pub secondary: String,
    /// Tertiary accent.
    pub tertiary: String,
    /// Surface tint; mirrors the primary colour.
    pub surface_tint: String,
}

/// Contents of `palette.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteOverride {
    /// Name of the palette source (a design app, or `default`).
    pub active_language: String,
    /// The colours.
    pub colors: PaletteColors,
}

impl PaletteOverride {
    /// Palette with the surface tint following `primary`.
    #[must_use]
    pub fn new(source: &str, primary: &str, secondary: &str, tertiary: &str) -> Self {
        Self {
            active_language: source.to_string(),
            colors: PaletteColors {
                primary: primary.to_string(),
                secondary: secondary.to_string(),
                tertiary: tertiary.to_string(),
                surface_tint: primary.to_string(),
            },
        }
    }

    /// Replace the primary colour (and the tint that follows it).
    pub fn set_primary(&mut self, primary: &str) {
        self.colors.primary = primary.to_string();
        self.colors.surface_tint = primary.to_string();
    }
}

/// Normalise user input to six lowercase hex digits, accepting a leading `#`.
#[must_use]
pub fn parse_hex_color(input: &str) -> Option<String> {
    let hex = input.trim().trim_start_matches('#');
    (hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .then(|| hex.to_ascii_lowercase())
}

/// The palette file at `path`, written wholesale.
#[derive(Debug, Clone)]
pub struct PaletteFile {
    /// Destination of the JSON record.
    pub path: PathBuf,
    /// Desired contents.
    pub palette: PaletteOverride,
}

impl PaletteFile {
    fn render(&self) -> Result<String> {
        let mut json =
            serde_json::to_string_pretty(&self.palette).context("serialize palette")?;
        json.push('\n');
        Ok(json)
    }
}

impl Applicable for PaletteFile {
    fn description(&self) -> String {
        self.path.display().to_string()
    }

    fn apply(&self) -> Result<ResourceChange> {
        if self.current_state()? == ResourceState::Correct {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        write_atomic(&self.path, self.render()?.as_bytes())?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for PaletteFile {
    fn current_state(&self) -> Result<ResourceState> {
        let Ok(existing) = std::fs::read_to_string(&self.path) else {
            return Ok(ResourceState::Missing);
        };
        // Byte comparison: keys this record does not know about must not
        // survive a write.
        if existing == self.render()? {
            return Ok(ResourceState::Correct);
        }
        let current = serde_json::from_str::<PaletteOverride>(&existing).map_or_else(
            |_| "unparseable palette file".to_string(),
            |current| format!("{} #{}", current.active_language, current.colors.primary),
        );
        Ok(ResourceState::Incorrect { current })
    }
}
