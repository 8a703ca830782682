//! Command-line interface.

use clap::Parser;

use crate::config::Overrides;
use crate::dispatch::Mode;

/// Version reported by `--version` and at startup.
pub const VERSION: &str = match option_env!("DOTSETUP_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Positional arguments that skip the preset menu and install everything.
pub const UNATTENDED_ALIASES: &[&str] = &["all", "full", "everything", "unattended"];

/// Top-level CLI entry point for the dotsetup provisioner.
#[derive(Parser, Debug)]
#[command(
    name = "dotsetup",
    about = "Interactive provisioning for the dotsetup desktop environment",
    version = VERSION
)]
pub struct Cli {
    /// `all`, `full`, `everything` or `unattended` to install every module
    /// without the preset menu
    pub mode: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the directory repositories are cloned into
    #[arg(long, env = "DOTSETUP_ROOT")]
    pub root: Option<std::path::PathBuf>,

    /// Use this configuration file instead of the default location
    #[arg(long, env = "DOTSETUP_CONFIG")]
    pub config: Option<std::path::PathBuf>,
}

impl Cli {
    /// Run mode selected by the positional argument.
    ///
    /// Unknown values fall back to the interactive menu.
    #[must_use]
    pub fn run_mode(&self) -> Mode {
        match self.mode.as_deref() {
            Some(arg) if UNATTENDED_ALIASES.contains(&arg.to_ascii_lowercase().as_str()) => {
                Mode::Unattended
            }
            _ => Mode::Interactive,
        }
    }

    /// Configuration overrides taken from the flags.
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            root: self.root.clone(),
            config_file: self.config.clone(),
        }
    }
}
