//! Lookup table from menu entries to installers.
//!
//! Every [`ModuleKind`] and [`Language`] is mapped to exactly one [`Task`].
//! [`ModuleRegistry::validate`] runs at startup so a missing mapping or a
//! clashing menu label fails before any prompt is shown.
use std::collections::HashSet;

use super::Task;
use super::companion::BuildCompanion;
use super::editor::InstallEditor;
use super::languages::InstallLanguage;
use super::palette::WritePalette;
use super::shell_config::InstallShellConfig;
use super::shell_rc::ConfigureShellRc;
use super::themes::InstallThemes;
use crate::error::TaskError;

/// A selectable module, in canonical run order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ModuleKind {
    /// Desktop shell configuration.
    ShellConfig,
    /// Companion command-line tool.
    CompanionCli,
    /// Settings application.
    SettingsApp,
    /// Terminal tool themes.
    Themes,
    /// Editor theme and extensions.
    Editor,
    /// Colour palette override.
    Palette,
    /// Shell rc PATH lines.
    ShellRc,
}

impl ModuleKind {
    /// Every module in canonical order.
    pub const ALL: [Self; 7] = [
        Self::ShellConfig,
        Self::CompanionCli,
        Self::SettingsApp,
        Self::Themes,
        Self::Editor,
        Self::Palette,
        Self::ShellRc,
    ];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ShellConfig => "Shell config",
            Self::CompanionCli => "Companion CLI",
            Self::SettingsApp => "Settings app",
            Self::Themes => "Themes",
            Self::Editor => "Editor",
            Self::Palette => "Palette",
            Self::ShellRc => "Shell rc",
        }
    }

    /// Parse a menu label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }
}

impl std::fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An optional programming-language toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// rustup with the stable toolchain.
    Rust,
    /// nvm with the current LTS release.
    Node,
    /// Go compiler and language server.
    Go,
    /// Python with pip and pipx.
    Python,
}

impl Language {
    /// Every language in menu order.
    pub const ALL: [Self; 4] = [Self::Rust, Self::Node, Self::Go, Self::Python];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Rust => "Rust",
            Self::Node => "Node",
            Self::Go => "Go",
            Self::Python => "Python",
        }
    }

    /// Parse a menu label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|l| l.label() == label)
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Installers keyed by module kind and language.
pub struct ModuleRegistry {
    modules: Vec<(ModuleKind, Box<dyn Task>)>,
    languages: Vec<(Language, Box<dyn Task>)>,
}

impl std::fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleRegistry")
            .field(
                "modules",
                &self.modules.iter().map(|(k, _)| *k).collect::<Vec<_>>(),
            )
            .field(
                "languages",
                &self.languages.iter().map(|(l, _)| *l).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl ModuleRegistry {
    /// A registry with no installers.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            modules: Vec::new(),
            languages: Vec::new(),
        }
    }

    /// The production installers.
    #[must_use]
    pub fn standard() -> Self {
        let mut registry = Self::empty()
            .with_module(ModuleKind::ShellConfig, Box::new(InstallShellConfig))
            .with_module(ModuleKind::CompanionCli, Box::new(BuildCompanion::cli()))
            .with_module(ModuleKind::SettingsApp, Box::new(BuildCompanion::settings()))
            .with_module(ModuleKind::Themes, Box::new(InstallThemes))
            .with_module(ModuleKind::Editor, Box::new(InstallEditor))
            .with_module(ModuleKind::Palette, Box::new(WritePalette))
            .with_module(ModuleKind::ShellRc, Box::new(ConfigureShellRc));
        for language in Language::ALL {
            registry = registry.with_language(language, Box::new(InstallLanguage::new(language)));
        }
        registry
    }

    /// Map `kind` to `task`, replacing any earlier mapping.
    #[must_use]
    pub fn with_module(mut self, kind: ModuleKind, task: Box<dyn Task>) -> Self {
        self.modules.retain(|(k, _)| *k != kind);
        self.modules.push((kind, task));
        self
    }

    /// Map `language` to `task`, replacing any earlier mapping.
    #[must_use]
    pub fn with_language(mut self, language: Language, task: Box<dyn Task>) -> Self {
        self.languages.retain(|(l, _)| *l != language);
        self.languages.push((language, task));
        self
    }

    /// Installer for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Unmapped`] if no installer is registered.
    pub fn module(&self, kind: ModuleKind) -> Result<&dyn Task, TaskError> {
        self.modules
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, task)| task.as_ref())
            .ok_or_else(|| TaskError::Unmapped(kind.label().to_string()))
    }

    /// Installer for `language`.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Unmapped`] if no installer is registered.
    pub fn language(&self, language: Language) -> Result<&dyn Task, TaskError> {
        self.languages
            .iter()
            .find(|(l, _)| *l == language)
            .map(|(_, task)| task.as_ref())
            .ok_or_else(|| TaskError::Unmapped(language.label().to_string()))
    }

    /// Check that every module and language is mapped and that menu labels
    /// are unique and parse back to the entry that produced them.
    ///
    /// # Errors
    ///
    /// Returns [`TaskError::Unmapped`] or [`TaskError::DuplicateLabel`].
    pub fn validate(&self) -> Result<(), TaskError> {
        let mut module_labels = HashSet::new();
        for kind in ModuleKind::ALL {
            self.module(kind)?;
            if !module_labels.insert(kind.label())
                || ModuleKind::from_label(kind.label()) != Some(kind)
            {
                return Err(TaskError::DuplicateLabel(kind.label().to_string()));
            }
        }
        let mut language_labels = HashSet::new();
        for language in Language::ALL {
            self.language(language)?;
            if !language_labels.insert(language.label())
                || Language::from_label(language.label()) != Some(language)
            {
                return Err(TaskError::DuplicateLabel(language.label().to_string()));
            }
        }
        Ok(())
    }
}
