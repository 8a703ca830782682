//! Preset and language menu state machine.
//!
//! ```text
//! SelectingPreset ─▶ RunningModules ─▶ SelectingLanguages ─▶ RunningLanguageModules ─▶ Done
//!        │                                   │
//!        └──────────── cancel ───────────────┴──────────────────────────────────────▶ Done
//! ```
//!
//! The dispatcher never fails. Installer errors are recorded by
//! [`tasks::execute`]; prompt failures and cancellations end the run.
use crate::logging::TaskStatus;
use crate::presets::{Preset, canonical_order};
use crate::prompt::TextStyle;
use crate::tasks::registry::{Language, ModuleKind, ModuleRegistry};
use crate::tasks::{self, Context};

/// States the dispatcher moves through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    /// Waiting for a preset choice.
    SelectingPreset,
    /// Running the module installers of the chosen preset.
    RunningModules,
    /// Offering optional language toolchains.
    SelectingLanguages,
    /// Running the chosen language installers.
    RunningLanguageModules,
    /// Terminal state.
    Done,
}

/// How the run was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Preset menu first.
    Interactive,
    /// Full preset without a menu; languages are still offered.
    Unattended,
}

/// What a dispatcher run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Preset that was selected, if any.
    pub preset: Option<Preset>,
    /// Modules executed, in order, with their outcome.
    pub modules: Vec<(ModuleKind, TaskStatus)>,
    /// Languages executed, in order, with their outcome.
    pub languages: Vec<(Language, TaskStatus)>,
    /// Every state entered, ending with [`DispatchState::Done`].
    pub trace: Vec<DispatchState>,
}

impl DispatchReport {
    const fn new() -> Self {
        Self {
            preset: None,
            modules: Vec::new(),
            languages: Vec::new(),
            trace: Vec::new(),
        }
    }

    /// Modules executed, in order.
    #[must_use]
    pub fn modules_run(&self) -> Vec<ModuleKind> {
        self.modules.iter().map(|(m, _)| *m).collect()
    }

    /// Languages executed, in order.
    #[must_use]
    pub fn languages_run(&self) -> Vec<Language> {
        self.languages.iter().map(|(l, _)| *l).collect()
    }
}

/// Drives menus and installers over a shared [`Context`].
#[derive(Debug)]
pub struct Dispatcher<'a> {
    ctx: &'a Context,
    registry: &'a ModuleRegistry,
}

impl<'a> Dispatcher<'a> {
    /// Create a dispatcher.
    #[must_use]
    pub const fn new(ctx: &'a Context, registry: &'a ModuleRegistry) -> Self {
        Self { ctx, registry }
    }

    /// Run the state machine to [`DispatchState::Done`].
    #[must_use]
    pub fn run(&self, mode: Mode) -> DispatchReport {
        let mut report = DispatchReport::new();
        let mut state = match mode {
            Mode::Interactive => DispatchState::SelectingPreset,
            Mode::Unattended => {
                report.preset = Some(Preset::Full);
                DispatchState::RunningModules
            }
        };
        let mut modules = Preset::Full.modules().unwrap_or_default().to_vec();
        let mut languages = Vec::new();

        loop {
            report.trace.push(state);
            state = match state {
                DispatchState::SelectingPreset => match self.select_modules() {
                    Some((preset, chosen)) => {
                        report.preset = Some(preset);
                        modules = chosen;
                        DispatchState::RunningModules
                    }
                    None => DispatchState::Done,
                },
                DispatchState::RunningModules => {
                    self.run_modules(&modules, &mut report);
                    DispatchState::SelectingLanguages
                }
                DispatchState::SelectingLanguages => match self.select_languages(mode) {
                    Some(chosen) if !chosen.is_empty() => {
                        languages = chosen;
                        DispatchState::RunningLanguageModules
                    }
                    _ => DispatchState::Done,
                },
                DispatchState::RunningLanguageModules => {
                    self.run_languages(&languages, &mut report);
                    DispatchState::Done
                }
                DispatchState::Done => break,
            };
        }
        report
    }

    /// Log a prompt failure and treat it as a cancellation.
    fn answered<T>(&self, what: &str, answer: anyhow::Result<Option<T>>) -> Option<T> {
        match answer {
            Ok(Some(value)) => Some(value),
            Ok(None) => {
                self.ctx.log.info(&format!("{what} cancelled"));
                None
            }
            Err(e) => {
                self.ctx.log.warn(&format!("{what} failed: {e:#}"));
                None
            }
        }
    }

    fn select_modules(&self) -> Option<(Preset, Vec<ModuleKind>)> {
        let labels = Preset::ALL.map(Preset::label);
        let picked = self.answered(
            "preset selection",
            self.ctx.prompt.choose("Choose a preset", &labels),
        )?;
        let preset = Preset::from_label(&picked)?;
        if let Some(fixed) = preset.modules() {
            return Some((preset, fixed.to_vec()));
        }

        let labels = ModuleKind::ALL.map(ModuleKind::label);
        let picked = self.answered(
            "module selection",
            self.ctx.prompt.choose_many("Choose modules", &labels),
        )?;
        let chosen: Vec<ModuleKind> = picked
            .iter()
            .filter_map(|label| ModuleKind::from_label(label))
            .collect();
        Some((preset, canonical_order(&chosen)))
    }

    fn run_modules(&self, modules: &[ModuleKind], report: &mut DispatchReport) {
        for kind in modules {
            let status = match self.registry.module(*kind) {
                Ok(task) => tasks::execute(task, self.ctx),
                Err(e) => {
                    self.ctx.log.error(&e.to_string());
                    TaskStatus::Failed
                }
            };
            report.modules.push((*kind, status));
        }

        let preset = report.preset.map_or("Selected", Preset::label);
        let notice = format!("{preset} preset completed");
        if let Err(e) = self.ctx.prompt.styled(&notice, TextStyle::Notice) {
            self.ctx.log.debug(&format!("styled output failed: {e:#}"));
            self.ctx.log.info(&notice);
        }
    }

    fn select_languages(&self, mode: Mode) -> Option<Vec<Language>> {
        if mode == Mode::Unattended {
            let wanted = self.answered(
                "language prompt",
                self.ctx
                    .prompt
                    .confirm("Install programming language toolchains?"),
            )?;
            if !wanted {
                return None;
            }
        }
        let labels = Language::ALL.map(Language::label);
        let picked = self.answered(
            "language selection",
            self.ctx
                .prompt
                .choose_many("Choose languages (none to skip)", &labels),
        )?;
        let mut chosen: Vec<Language> = Vec::new();
        for language in picked.iter().filter_map(|label| Language::from_label(label)) {
            if !chosen.contains(&language) {
                chosen.push(language);
            }
        }
        Some(chosen)
    }

    fn run_languages(&self, languages: &[Language], report: &mut DispatchReport) {
        for language in languages {
            let status = match self.registry.language(*language) {
                Ok(task) => tasks::execute(task, self.ctx),
                Err(e) => {
                    self.ctx.log.error(&e.to_string());
                    TaskStatus::Failed
                }
            };
            report.languages.push((*language, status));
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::tasks::test_helpers::{Reply, TestEnv};
    use crate::tasks::{Task, TaskResult};
    use std::sync::{Arc, Mutex};

    /// Installer double that records its name and returns a fixed result.
    struct Recorder {
        name: &'static str,
        fail: bool,
        ran: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Task for Recorder {
        fn name(&self) -> &str {
            self.name
        }
        fn run(&self, _: &Context) -> anyhow::Result<TaskResult> {
            self.ran.lock().unwrap().push(self.name);
            if self.fail {
                anyhow::bail!("{} broke", self.name);
            }
            Ok(TaskResult::Ok)
        }
    }

    type Ran = Arc<Mutex<Vec<&'static str>>>;

    fn recording_registry(failing: &[ModuleKind]) -> (ModuleRegistry, Ran) {
        let ran: Ran = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ModuleRegistry::empty();
        for kind in ModuleKind::ALL {
            registry = registry.with_module(
                kind,
                Box::new(Recorder {
                    name: kind.label(),
                    fail: failing.contains(&kind),
                    ran: Arc::clone(&ran),
                }),
            );
        }
        for language in Language::ALL {
            registry = registry.with_language(
                language,
                Box::new(Recorder {
                    name: language.label(),
                    fail: false,
                    ran: Arc::clone(&ran),
                }),
            );
        }
        (registry, ran)
    }

    fn choose(label: &str) -> Reply {
        Reply::Choose(Some(label.to_string()))
    }

    fn many(labels: &[&str]) -> Reply {
        Reply::ChooseMany(Some(labels.iter().map(|l| (*l).to_string()).collect()))
    }

    #[test]
    fn core_preset_runs_in_order_then_offers_languages() {
        let env = TestEnv::new();
        env.prompt.script([choose("Core"), many(&[])]);
        let (registry, ran) = recording_registry(&[]);
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Interactive);
        assert_eq!(*ran.lock().unwrap(), vec!["Shell config", "Companion CLI"]);
        assert_eq!(report.preset, Some(Preset::Core));
        assert_eq!(
            report.trace,
            vec![
                DispatchState::SelectingPreset,
                DispatchState::RunningModules,
                DispatchState::SelectingLanguages,
                DispatchState::Done,
            ]
        );
        assert_eq!(env.prompt.notices(), vec!["Core preset completed"]);
    }

    #[test]
    fn cancel_at_preset_goes_straight_to_done() {
        let env = TestEnv::new();
        env.prompt.script([Reply::Choose(None)]);
        let (registry, ran) = recording_registry(&[]);
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Interactive);
        assert!(ran.lock().unwrap().is_empty());
        assert_eq!(
            report.trace,
            vec![DispatchState::SelectingPreset, DispatchState::Done]
        );
        assert!(env.prompt.notices().is_empty());
    }

    #[test]
    fn custom_selection_runs_in_canonical_order() {
        let env = TestEnv::new();
        env.prompt.script([
            choose("Custom"),
            many(&["Palette", "Shell config", "Themes"]),
            many(&[]),
        ]);
        let (registry, ran) = recording_registry(&[]);
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Interactive);
        assert_eq!(
            *ran.lock().unwrap(),
            vec!["Shell config", "Themes", "Palette"]
        );
        assert_eq!(report.preset, Some(Preset::Custom));
    }

    #[test]
    fn cancel_at_custom_selection_is_done() {
        let env = TestEnv::new();
        env.prompt
            .script([choose("Custom"), Reply::ChooseMany(None)]);
        let (registry, ran) = recording_registry(&[]);
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Interactive);
        assert!(ran.lock().unwrap().is_empty());
        assert_eq!(report.trace.last(), Some(&DispatchState::Done));
    }

    #[test]
    fn failing_module_does_not_stop_the_rest() {
        let env = TestEnv::new();
        env.prompt.script([choose("Designer"), many(&[])]);
        let (registry, ran) = recording_registry(&[ModuleKind::CompanionCli]);
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Interactive);
        assert_eq!(ran.lock().unwrap().len(), 5);
        assert_eq!(report.modules[1], (ModuleKind::CompanionCli, TaskStatus::Failed));
        assert_eq!(report.modules[4], (ModuleKind::Palette, TaskStatus::Ok));
        assert_eq!(env.prompt.notices(), vec!["Designer preset completed"]);
    }

    #[test]
    fn languages_run_in_selection_order() {
        let env = TestEnv::new();
        env.prompt
            .script([choose("Core"), many(&["Python", "Rust", "Python"])]);
        let (registry, _) = recording_registry(&[]);
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Interactive);
        assert_eq!(report.languages_run(), vec![Language::Python, Language::Rust]);
        assert_eq!(
            report.trace[2..],
            [
                DispatchState::SelectingLanguages,
                DispatchState::RunningLanguageModules,
                DispatchState::Done,
            ]
        );
    }

    #[test]
    fn unattended_runs_full_then_asks_yes_no() {
        let env = TestEnv::new();
        env.prompt
            .script([Reply::Confirm(Some(true)), many(&["Go"])]);
        let (registry, ran) = recording_registry(&[]);
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Unattended);
        assert_eq!(report.preset, Some(Preset::Full));
        assert_eq!(report.modules_run(), ModuleKind::ALL.to_vec());
        assert_eq!(report.languages_run(), vec![Language::Go]);
        assert_eq!(ran.lock().unwrap().last(), Some(&"Go"));
        assert_eq!(report.trace[0], DispatchState::RunningModules);
    }

    #[test]
    fn unattended_declining_languages_is_done() {
        let env = TestEnv::new();
        env.prompt.script([Reply::Confirm(Some(false))]);
        let (registry, _) = recording_registry(&[]);
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Unattended);
        assert!(report.languages.is_empty());
        assert_eq!(env.prompt.remaining(), 0);
    }

    #[test]
    fn prompt_error_is_treated_as_cancel() {
        let env = TestEnv::new();
        // nothing scripted: the first prompt errors
        let (registry, _) = recording_registry(&[]);
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Interactive);
        assert_eq!(report.trace.last(), Some(&DispatchState::Done));
        assert_eq!(env.log.at("warn").len(), 1);
    }

    #[test]
    fn unmapped_module_is_recorded_as_failed() {
        let env = TestEnv::new();
        env.prompt.script([choose("Core"), many(&[])]);
        let registry = ModuleRegistry::empty();
        let ctx = env.context();

        let report = Dispatcher::new(&ctx, &registry).run(Mode::Interactive);
        assert_eq!(
            report.modules,
            vec![
                (ModuleKind::ShellConfig, TaskStatus::Failed),
                (ModuleKind::CompanionCli, TaskStatus::Failed),
            ]
        );
    }
}
