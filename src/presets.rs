//! Preset bundles of modules.
use crate::tasks::registry::ModuleKind;

/// A named bundle of modules offered in the first menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    /// Shell configuration and the companion CLI.
    Core,
    /// Core plus the settings app, editor and shell rc.
    Developer,
    /// Core plus the settings app, themes and palette.
    Designer,
    /// Every module.
    Full,
    /// A user-chosen subset.
    Custom,
}

impl Preset {
    /// Every preset in menu order.
    pub const ALL: [Self; 5] = [
        Self::Core,
        Self::Developer,
        Self::Designer,
        Self::Full,
        Self::Custom,
    ];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Core => "Core",
            Self::Developer => "Developer",
            Self::Designer => "Designer",
            Self::Full => "Full",
            Self::Custom => "Custom",
        }
    }

    /// Parse a menu label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }

    /// Fixed module sequence, or `None` for [`Preset::Custom`].
    #[must_use]
    pub const fn modules(self) -> Option<&'static [ModuleKind]> {
        use ModuleKind::{
            CompanionCli, Editor, Palette, SettingsApp, ShellConfig, ShellRc, Themes,
        };
        match self {
            Self::Core => Some(&[ShellConfig, CompanionCli]),
            Self::Developer => Some(&[ShellConfig, CompanionCli, SettingsApp, Editor, ShellRc]),
            Self::Designer => Some(&[ShellConfig, CompanionCli, SettingsApp, Themes, Palette]),
            Self::Full => Some(&ModuleKind::ALL),
            Self::Custom => None,
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Deduplicate `selection` and put it in canonical module order.
#[must_use]
pub fn canonical_order(selection: &[ModuleKind]) -> Vec<ModuleKind> {
    let mut modules = selection.to_vec();
    modules.sort_unstable();
    modules.dedup();
    modules
}
