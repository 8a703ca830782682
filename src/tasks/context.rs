//! Shared state handed to every installer.

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::exec::Executor;
use crate::git::VersionControl;
use crate::logging::Log;
use crate::prompt::Prompter;
use crate::resources::package::PackageManager;

/// Shared context for installer execution.
pub struct Context {
    /// Resolved configuration.
    pub config: Arc<Config>,
    /// Logger for output and installer recording.
    pub log: Arc<dyn Log>,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Version-control capability used by the repository synchroniser.
    pub vcs: Arc<dyn VersionControl>,
    /// User interaction capability.
    pub prompt: Arc<dyn Prompter>,
    /// Whether installers may ask questions. Unattended runs take defaults.
    pub interactive: bool,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("config", &self.config)
            .field("log", &"<dyn Log>")
            .field("executor", &"<dyn Executor>")
            .field("vcs", &"<dyn VersionControl>")
            .field("prompt", &"<dyn Prompter>")
            .field("interactive", &self.interactive)
            .finish()
    }
}

impl Context {
    /// Creates a new context.
    #[must_use]
    pub fn new(
        config: Arc<Config>,
        log: Arc<dyn Log>,
        executor: Arc<dyn Executor>,
        vcs: Arc<dyn VersionControl>,
        prompt: Arc<dyn Prompter>,
    ) -> Self {
        Self {
            config,
            log,
            executor,
            vcs,
            prompt,
            interactive: true,
        }
    }

    /// Same context with the interactive flag set to `interactive`.
    #[must_use]
    pub const fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// User's home directory.
    #[must_use]
    pub fn home(&self) -> &PathBuf {
        &self.config.home
    }

    /// The AUR helper on PATH, or plain pacman when none is installed.
    #[must_use]
    pub fn package_manager(&self) -> PackageManager {
        PackageManager::detect_helper(&*self.executor).unwrap_or(PackageManager::Pacman)
    }
}
