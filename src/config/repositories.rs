//! The fixed set of upstream repositories and their per-repository settings.
use serde::Deserialize;

/// Desktop shell configuration.
pub const SHELL: &str = "shell";
/// Companion command-line tool.
pub const CLI: &str = "cli";
/// Settings application.
pub const SETTINGS: &str = "settings";
/// Terminal and toolkit themes.
pub const THEMES: &str = "themes";
/// Editor theme extension.
pub const EDITOR: &str = "editor";

/// Remote that hosts every default repository.
pub const DEFAULT_REMOTE_BASE: &str = "https://github.com/dotsetup";

/// How a synced tree is turned into an installed binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSpec {
    /// Binary name produced by `cargo install`.
    pub binary: String,
    /// Packaged builds that would shadow the source build.
    pub conflicts: Vec<String>,
}

/// A repository mirrored under `repos_root/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositorySpec {
    /// Short name; also the directory name under the repos root.
    pub name: String,
    /// Remote URL.
    pub url: String,
    /// Keep a dirty working tree instead of resetting it.
    pub preserve_local_changes: bool,
    /// Build step run after sync, if any.
    pub build: Option<BuildSpec>,
}

impl RepositorySpec {
    fn upstream(name: &str) -> Self {
        Self {
            name: name.to_string(),
            url: format!("{DEFAULT_REMOTE_BASE}/{name}.git"),
            preserve_local_changes: false,
            build: None,
        }
    }

    fn with_build(mut self, binary: &str, conflicts: &[&str]) -> Self {
        self.build = Some(BuildSpec {
            binary: binary.to_string(),
            conflicts: conflicts.iter().map(|c| (*c).to_string()).collect(),
        });
        self
    }
}

/// Built-in repository table.
#[must_use]
pub fn defaults() -> Vec<RepositorySpec> {
    let mut cli = RepositorySpec::upstream(CLI).with_build("dots", &["dots-bin", "dots-git"]);
    cli.preserve_local_changes = true;
    vec![
        RepositorySpec::upstream(SHELL),
        cli,
        RepositorySpec::upstream(SETTINGS).with_build("dots-settings", &["dots-settings-bin"]),
        RepositorySpec::upstream(THEMES),
        RepositorySpec::upstream(EDITOR),
    ]
}

/// Per-repository overrides accepted in the config file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RepositoryOverride {
    /// Replacement remote URL.
    pub url: Option<String>,
    /// Replacement preserve-local flag.
    pub preserve_local_changes: Option<bool>,
}

impl RepositoryOverride {
    /// Apply the set fields onto `spec`.
    pub fn apply_to(&self, spec: &mut RepositorySpec) {
        if let Some(url) = &self.url {
            spec.url.clone_from(url);
        }
        if let Some(preserve) = self.preserve_local_changes {
            spec.preserve_local_changes = preserve;
        }
    }
}
