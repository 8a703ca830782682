//! Run configuration: filesystem roots, repositories, and installer settings.
//!
//! Values are layered: built-in defaults derived from the environment, then
//! an optional TOML file, then command-line overrides.
pub mod repositories;
pub mod toml_loader;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use serde::Deserialize;

pub use repositories::{BuildSpec, RepositorySpec};

/// Directive that the desktop shell's runtime rejects in themed scripts.
pub const DEFAULT_DIRECTIVE: &str = "pragma ComponentBehavior";

/// Marketplace extensions installed alongside the editor theme.
pub const DEFAULT_EDITOR_EXTENSIONS: &[&str] = &["pkief.material-icon-theme"];

/// Base directories resolved from the process environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseDirs {
    /// `$HOME`.
    pub home: PathBuf,
    /// `$XDG_CONFIG_HOME` or `~/.config`.
    pub config_home: PathBuf,
    /// `$XDG_DATA_HOME` or `~/.local/share`.
    pub data_home: PathBuf,
    /// `$XDG_STATE_HOME` or `~/.local/state`.
    pub state_home: PathBuf,
}

impl BaseDirs {
    /// XDG defaults relative to `home`.
    #[must_use]
    pub fn from_home(home: &Path) -> Self {
        Self {
            home: home.to_path_buf(),
            config_home: home.join(".config"),
            data_home: home.join(".local/share"),
            state_home: home.join(".local/state"),
        }
    }

    /// Resolve from `HOME` and the `XDG_*` variables.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is not set.
    pub fn from_env() -> Result<Self> {
        let home = std::env::var("HOME")
            .map(PathBuf::from)
            .map_err(|_| anyhow::anyhow!("HOME environment variable is not set"))?;
        let mut dirs = Self::from_home(&home);
        let xdg = |var: &str| {
            std::env::var(var)
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
        };
        if let Some(p) = xdg("XDG_CONFIG_HOME") {
            dirs.config_home = p;
        }
        if let Some(p) = xdg("XDG_DATA_HOME") {
            dirs.data_home = p;
        }
        if let Some(p) = xdg("XDG_STATE_HOME") {
            dirs.state_home = p;
        }
        Ok(dirs)
    }
}

/// Command-line overrides applied last.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Replaces the repositories root.
    pub root: Option<PathBuf>,
    /// Explicit config file; must exist when given.
    pub config_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PathsSection {
    repos_root: Option<String>,
    config_root: Option<String>,
    state_dir: Option<String>,
    install_root: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EditorSection {
    extensions: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DeploySection {
    directive: Option<String>,
}

/// On-disk shape of `config.toml`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    paths: PathsSection,
    repositories: BTreeMap<String, repositories::RepositoryOverride>,
    editor: EditorSection,
    deploy: DeploySection,
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// User home directory.
    pub home: PathBuf,
    /// Parent of every synced repository.
    pub repos_root: PathBuf,
    /// Root for deployed configuration (`~/.config`).
    pub config_root: PathBuf,
    /// Where program state such as the palette override lives.
    pub state_dir: PathBuf,
    /// Prefix passed to `cargo install --root`.
    pub install_root: PathBuf,
    /// Managed repositories in canonical order.
    pub repositories: Vec<RepositorySpec>,
    /// Marketplace extension IDs for the editor module.
    pub editor_extensions: Vec<String>,
    /// Keyword stripped from script-like themed files.
    pub directive_keyword: String,
}

impl Config {
    /// Built-in configuration for the given base directories.
    #[must_use]
    pub fn defaults(dirs: &BaseDirs) -> Self {
        Self {
            home: dirs.home.clone(),
            repos_root: dirs.data_home.join("dotsetup"),
            config_root: dirs.config_home.clone(),
            state_dir: dirs.state_home.join("dotsetup"),
            install_root: dirs.home.join(".local"),
            repositories: repositories::defaults(),
            editor_extensions: DEFAULT_EDITOR_EXTENSIONS
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
            directive_keyword: DEFAULT_DIRECTIVE.to_string(),
        }
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `HOME` is unset or the config file is invalid.
    pub fn load(overrides: &Overrides) -> Result<Self> {
        Self::load_with(&BaseDirs::from_env()?, overrides)
    }

    /// Load configuration against explicit base directories.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit config file is missing, the file
    /// cannot be parsed, or it names an unknown repository.
    pub fn load_with(dirs: &BaseDirs, overrides: &Overrides) -> Result<Self> {
        let path = match &overrides.config_file {
            Some(explicit) => {
                if !explicit.exists() {
                    bail!("config file not found: {}", explicit.display());
                }
                explicit.clone()
            }
            None => dirs.config_home.join("dotsetup/config.toml"),
        };
        let file: ConfigFile = toml_loader::load_config(&path)?;

        let mut config = Self::defaults(dirs);
        config
            .merge(file)
            .with_context(|| format!("invalid configuration in {}", path.display()))?;
        if let Some(root) = &overrides.root {
            config.repos_root.clone_from(root);
        }
        Ok(config)
    }

    fn merge(&mut self, file: ConfigFile) -> Result<()> {
        let home = self.home.clone();
        let expand = |raw: &str| expand_home(raw, &home);
        if let Some(p) = file.paths.repos_root.as_deref() {
            self.repos_root = expand(p);
        }
        if let Some(p) = file.paths.config_root.as_deref() {
            self.config_root = expand(p);
        }
        if let Some(p) = file.paths.state_dir.as_deref() {
            self.state_dir = expand(p);
        }
        if let Some(p) = file.paths.install_root.as_deref() {
            self.install_root = expand(p);
        }

        for (name, repo_override) in &file.repositories {
            let Some(spec) = self.repositories.iter_mut().find(|r| &r.name == name) else {
                bail!("unknown repository '{name}'");
            };
            repo_override.apply_to(spec);
        }

        if let Some(extensions) = file.editor.extensions {
            self.editor_extensions = extensions;
        }
        if let Some(directive) = file.deploy.directive {
            if directive.trim().is_empty() {
                bail!("deploy.directive must not be empty");
            }
            self.directive_keyword = directive;
        }
        Ok(())
    }

    /// Look up a managed repository by short name.
    #[must_use]
    pub fn repository(&self, name: &str) -> Option<&RepositorySpec> {
        self.repositories.iter().find(|r| r.name == name)
    }

    /// Local working tree of the repository `name`.
    #[must_use]
    pub fn repo_path(&self, name: &str) -> PathBuf {
        self.repos_root.join(name)
    }
}

/// Expand a leading `~/` against `home`.
fn expand_home(raw: &str, home: &Path) -> PathBuf {
    match raw.strip_prefix("~/") {
        Some(rest) => home.join(rest),
        None if raw == "~" => home.to_path_buf(),
        None => PathBuf::from(raw),
    }
}
