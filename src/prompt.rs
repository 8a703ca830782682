//! Interactive prompts behind the [`Prompter`] seam.
//!
//! Every prompt is a blocking request/response call. Cancellation (Esc,
//! Ctrl-C, closed terminal) is reported as `Ok(None)` and never as an error,
//! so callers can treat it as "stop here" without unwinding.
use std::sync::Arc;

use anyhow::Result;

use crate::exec::Executor;

/// Presentation of a styled message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Bordered banner for section titles.
    Banner,
    /// Highlighted one-line notice.
    Notice,
}

/// Blocking user-interaction capability.
pub trait Prompter: Send + Sync {
    /// Pick one of `options`.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt tool cannot be started.
    fn choose(&self, header: &str, options: &[&str]) -> Result<Option<String>>;

    /// Pick any subset of `options`, returned in the order the tool reports.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt tool cannot be started.
    fn choose_many(&self, header: &str, options: &[&str]) -> Result<Option<Vec<String>>>;

    /// Free-text input.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt tool cannot be started.
    fn input(&self, header: &str, placeholder: &str) -> Result<Option<String>>;

    /// Yes/no question.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt tool cannot be started.
    fn confirm(&self, question: &str) -> Result<Option<bool>>;

    /// Print `text` with the given style.
    ///
    /// # Errors
    ///
    /// Returns an error if the prompt tool cannot be started.
    fn styled(&self, text: &str, style: TextStyle) -> Result<()>;
}

/// [`Prompter`] implemented with the `gum` terminal UI tool.
pub struct GumPrompter {
    executor: Arc<dyn Executor>,
}

impl std::fmt::Debug for GumPrompter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GumPrompter").finish_non_exhaustive()
    }
}

impl GumPrompter {
    /// Create a prompter that launches `gum` through `executor`.
    #[must_use]
    pub fn new(executor: Arc<dyn Executor>) -> Self {
        Self { executor }
    }

    fn selection(&self, args: &[&str]) -> Result<Option<Vec<String>>> {
        let result = self.executor.run_interactive("gum", args)?;
        if !result.success {
            return Ok(None);
        }
        let picked: Vec<String> = result
            .stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        Ok(Some(picked))
    }
}

impl Prompter for GumPrompter {
    fn choose(&self, header: &str, options: &[&str]) -> Result<Option<String>> {
        let mut args = vec!["choose", "--header", header];
        args.extend_from_slice(options);
        Ok(self
            .selection(&args)?
            .and_then(|picked| picked.into_iter().next()))
    }

    fn choose_many(&self, header: &str, options: &[&str]) -> Result<Option<Vec<String>>> {
        let mut args = vec!["choose", "--no-limit", "--header", header];
        args.extend_from_slice(options);
        self.selection(&args)
    }

    fn input(&self, header: &str, placeholder: &str) -> Result<Option<String>> {
        let result = self.executor.run_interactive(
            "gum",
            &["input", "--header", header, "--placeholder", placeholder],
        )?;
        if !result.success {
            return Ok(None);
        }
        Ok(Some(result.stdout.trim().to_string()))
    }

    fn confirm(&self, question: &str) -> Result<Option<bool>> {
        let result = self.executor.run_interactive("gum", &["confirm", question])?;
        Ok(match result.code {
            Some(0) => Some(true),
            Some(1) => Some(false),
            // 130: aborted with Ctrl-C or Esc
            _ => None,
        })
    }

    #[allow(clippy::print_stdout)]
    fn styled(&self, text: &str, style: TextStyle) -> Result<()> {
        let args: &[&str] = match style {
            TextStyle::Banner => &[
                "style",
                "--border",
                "rounded",
                "--padding",
                "0 2",
                "--foreground",
                "212",
                text,
            ],
            TextStyle::Notice => &["style", "--bold", "--foreground", "212", text],
        };
        let result = self.executor.run_interactive("gum", args)?;
        if result.success {
            print!("{}", result.stdout);
        } else {
            println!("{text}");
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    fn prompter(mock: MockExecutor) -> (GumPrompter, Arc<MockExecutor>) {
        let mock = Arc::new(mock);
        (GumPrompter::new(Arc::clone(&mock) as Arc<dyn Executor>), mock)
    }

    #[test]
    fn choose_returns_selected_line() {
        let (p, mock) = prompter(MockExecutor::ok("Designer\n"));
        let picked = p.choose("Preset", &["Core", "Designer"]).unwrap();
        assert_eq!(picked, Some("Designer".to_string()));
        assert_eq!(
            mock.calls(),
            vec!["gum choose --header Preset Core Designer".to_string()]
        );
    }

    #[test]
    fn choose_cancel_is_none() {
        let (p, _) = prompter(MockExecutor::with_exit_codes(vec![(130, String::new())]));
        assert_eq!(p.choose("Preset", &["Core"]).unwrap(), None);
    }

    #[test]
    fn choose_many_splits_lines() {
        let (p, mock) = prompter(MockExecutor::ok("Themes\nPalette\n"));
        let picked = p.choose_many("Modules", &["Themes", "Palette"]).unwrap();
        assert_eq!(
            picked,
            Some(vec!["Themes".to_string(), "Palette".to_string()])
        );
        assert!(mock.calls()[0].starts_with("gum choose --no-limit"));
    }

    #[test]
    fn choose_many_empty_selection_is_some_empty() {
        let (p, _) = prompter(MockExecutor::ok(""));
        assert_eq!(p.choose_many("Modules", &["Themes"]).unwrap(), Some(vec![]));
    }

    #[test]
    fn confirm_maps_exit_codes() {
        let (p, _) = prompter(MockExecutor::with_exit_codes(vec![
            (0, String::new()),
            (1, String::new()),
            (130, String::new()),
        ]));
        assert_eq!(p.confirm("Continue?").unwrap(), Some(true));
        assert_eq!(p.confirm("Continue?").unwrap(), Some(false));
        assert_eq!(p.confirm("Continue?").unwrap(), None);
    }

    #[test]
    fn input_trims_value() {
        let (p, _) = prompter(MockExecutor::ok("  00aaff \n"));
        assert_eq!(
            p.input("Primary colour", "ff3e00").unwrap(),
            Some("00aaff".to_string())
        );
    }
}
