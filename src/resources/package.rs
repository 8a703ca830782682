//! Package installation resource.
use std::collections::HashSet;

use anyhow::Result;

use super::{Applicable, Resource, ResourceChange, ResourceState};
use crate::exec::Executor;

/// Supported package managers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    /// Official repository packages (pacman through sudo).
    Pacman,
    /// AUR helper paru.
    Paru,
    /// AUR helper yay.
    Yay,
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.program())
    }
}

impl PackageManager {
    /// AUR helpers in order of preference.
    pub const HELPERS: [Self; 2] = [Self::Paru, Self::Yay];

    /// Executable name.
    #[must_use]
    pub const fn program(self) -> &'static str {
        match self {
            Self::Pacman => "pacman",
            Self::Paru => "paru",
            Self::Yay => "yay",
        }
    }

    /// First AUR helper found on PATH.
    #[must_use]
    pub fn detect_helper(executor: &dyn Executor) -> Option<Self> {
        Self::HELPERS
            .into_iter()
            .find(|helper| executor.which(helper.program()))
    }

    /// Run `<manager> <flags> <names…>`, through sudo for pacman.
    fn invoke(self, executor: &dyn Executor, flags: &[&str], names: &[&str]) -> Result<()> {
        let mut args: Vec<&str> = Vec::with_capacity(flags.len() + names.len() + 1);
        let program = if self == Self::Pacman {
            args.push("pacman");
            "sudo"
        } else {
            self.program()
        };
        args.extend_from_slice(flags);
        args.extend_from_slice(names);
        executor.run(program, &args)?;
        Ok(())
    }

    /// Install `names` in one call, skipping those already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager exits non-zero.
    pub fn install(self, executor: &dyn Executor, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        self.invoke(executor, &["-S", "--needed", "--noconfirm"], names)
    }

    /// Remove `names` together with their unneeded dependencies.
    ///
    /// # Errors
    ///
    /// Returns an error if the package manager exits non-zero.
    pub fn remove(self, executor: &dyn Executor, names: &[&str]) -> Result<()> {
        if names.is_empty() {
            return Ok(());
        }
        self.invoke(executor, &["-Rns", "--noconfirm"], names)
    }
}

/// Query the full set of installed package names.
///
/// Runs a single `pacman -Q`; a failing query yields an empty set.
///
/// # Errors
///
/// Returns an error if `pacman` cannot be spawned.
pub fn get_installed_packages(executor: &dyn Executor) -> Result<HashSet<String>> {
    let result = executor.run_unchecked("pacman", &["-Q"])?;
    let mut set = HashSet::new();
    if result.success {
        for line in result.stdout.lines() {
            if let Some(name) = line.split_whitespace().next() {
                set.insert(name.to_string());
            }
        }
    }
    Ok(set)
}

/// A system package resource that can be checked and installed.
#[derive(Debug)]
pub struct PackageResource<'a> {
    /// Package name.
    pub name: String,
    /// Package manager to use.
    pub manager: PackageManager,
    executor: &'a dyn Executor,
}

impl<'a> PackageResource<'a> {
    /// Create a new package resource.
    #[must_use]
    pub const fn new(name: String, manager: PackageManager, executor: &'a dyn Executor) -> Self {
        Self {
            name,
            manager,
            executor,
        }
    }

    /// Determine the state from a pre-fetched set of installed names.
    #[must_use]
    pub fn state_from_installed(&self, installed: &HashSet<String>) -> ResourceState {
        if installed.contains(&self.name) {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        }
    }
}

impl Applicable for PackageResource<'_> {
    fn description(&self) -> String {
        format!("{} ({})", self.name, self.manager)
    }

    fn apply(&self) -> Result<ResourceChange> {
        self.manager.install(self.executor, &[&self.name])?;
        Ok(ResourceChange::Applied)
    }

    fn remove(&self) -> Result<ResourceChange> {
        if self.current_state()? == ResourceState::Missing {
            return Ok(ResourceChange::AlreadyCorrect);
        }
        self.manager.remove(self.executor, &[&self.name])?;
        Ok(ResourceChange::Applied)
    }
}

impl Resource for PackageResource<'_> {
    fn current_state(&self) -> Result<ResourceState> {
        let result = self.executor.run_unchecked("pacman", &["-Q", &self.name])?;
        Ok(if result.success {
            ResourceState::Correct
        } else {
            ResourceState::Missing
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn installed_set_parses_names() {
        let mock = MockExecutor::ok("git 2.45.0-1\ngum 0.14.1-1\n");
        let set = get_installed_packages(&mock).unwrap();
        assert!(set.contains("git"));
        assert!(set.contains("gum"));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn installed_set_empty_on_failure() {
        let mock = MockExecutor::fail();
        assert!(get_installed_packages(&mock).unwrap().is_empty());
    }

    #[test]
    fn helper_install_is_needed_and_noninteractive() {
        let mock = MockExecutor::ok("");
        PackageManager::Paru
            .install(&mock, &["rustup", "rust-analyzer"])
            .unwrap();
        assert_eq!(
            mock.calls(),
            vec!["paru -S --needed --noconfirm rustup rust-analyzer".to_string()]
        );
    }

    #[test]
    fn pacman_goes_through_sudo() {
        let mock = MockExecutor::ok("");
        PackageManager::Pacman.install(&mock, &["git"]).unwrap();
        assert_eq!(
            mock.calls(),
            vec!["sudo pacman -S --needed --noconfirm git".to_string()]
        );
    }

    #[test]
    fn empty_install_runs_nothing() {
        let mock = MockExecutor::ok("");
        PackageManager::Yay.install(&mock, &[]).unwrap();
        assert_eq!(mock.call_count(), 0);
    }

    #[test]
    fn remove_skips_absent_package() {
        let mock = MockExecutor::fail();
        let resource = PackageResource::new("dots-bin".to_string(), PackageManager::Yay, &mock);
        assert_eq!(resource.remove().unwrap(), ResourceChange::AlreadyCorrect);
        assert_eq!(mock.call_count(), 1);
    }

    #[test]
    fn remove_uninstalls_present_package() {
        let mock = MockExecutor::with_responses(vec![
            (true, "dots-bin 1.0-1".to_string()),
            (true, String::new()),
        ]);
        let resource = PackageResource::new("dots-bin".to_string(), PackageManager::Yay, &mock);
        assert_eq!(resource.remove().unwrap(), ResourceChange::Applied);
        assert_eq!(mock.calls()[1], "yay -Rns --noconfirm dots-bin");
    }

    #[test]
    fn debug_output_names_package_and_manager() {
        let mock = MockExecutor::ok("");
        let resource = PackageResource::new("dots-bin".to_string(), PackageManager::Paru, &mock);
        let debug = format!("{resource:?}");
        assert!(debug.contains("dots-bin"), "{debug}");
        assert!(debug.contains("Paru"), "{debug}");
        assert!(debug.contains("MockExecutor"), "{debug}");
    }

    #[test]
    fn detect_helper_prefers_paru() {
        let mock = MockExecutor::ok("").with_which(true);
        assert_eq!(
            PackageManager::detect_helper(&mock),
            Some(PackageManager::Paru)
        );
        let none = MockExecutor::ok("");
        assert_eq!(PackageManager::detect_helper(&none), None);
    }

    #[test]
    fn state_from_installed() {
        let mock = MockExecutor::ok("");
        let resource = PackageResource::new("gum".to_string(), PackageManager::Paru, &mock);
        let mut installed = HashSet::new();
        assert_eq!(resource.state_from_installed(&installed), ResourceState::Missing);
        installed.insert("gum".to_string());
        assert_eq!(resource.state_from_installed(&installed), ResourceState::Correct);
    }
}
