// Shared helpers for integration tests.
//
// Builds local upstream repositories with the real git CLI, a temporary home
// directory with a configuration pointing at them, and in-memory doubles for
// prompts, logging and every program other than git.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::{BTreeSet, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use dotsetup::config::{BaseDirs, Config};
use dotsetup::exec::{ExecResult, Executor, SystemExecutor};
use dotsetup::git::{GitCli, VersionControl};
use dotsetup::logging::{Log, TaskEntry, TaskStatus};
use dotsetup::prompt::{Prompter, TextStyle};
use dotsetup::tasks::Context;

/// Whether the git CLI is available; tests that need it return early
/// otherwise.
pub fn git_available() -> bool {
    SystemExecutor.which("git")
}

/// Run git in `dir` with a fixed identity, panicking on failure.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

// ---- upstream repositories

/// A local repository standing in for a remote.
#[derive(Debug, Clone)]
pub struct Upstream {
    /// Working tree of the upstream repository; also its clone URL.
    pub path: PathBuf,
}

impl Upstream {
    /// Create a repository on branch `main` with one commit of `files`.
    pub fn create(path: &Path, files: &[(&str, &str)]) -> Self {
        std::fs::create_dir_all(path).expect("create upstream dir");
        git(path, &["init", "-q", "-b", "main"]);
        let upstream = Self {
            path: path.to_path_buf(),
        };
        upstream.commit(files, "initial");
        upstream
    }

    /// Write `files` and commit them.
    pub fn commit(&self, files: &[(&str, &str)], message: &str) {
        for (rel, content) in files {
            let path = self.path.join(rel);
            std::fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
            std::fs::write(path, content).expect("write upstream file");
        }
        git(&self.path, &["add", "-A"]);
        git(&self.path, &["commit", "-q", "--allow-empty", "-m", message]);
    }

    /// Commit id of the upstream tip.
    pub fn head(&self) -> String {
        git(&self.path, &["rev-parse", "HEAD"])
    }

    /// Clone URL.
    pub fn url(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

// ---- executor

/// Executor that runs git for real and only records everything else.
///
/// `which` answers from an allowlist, so tests decide which optional tools
/// (cargo, code, design apps) appear installed.
#[derive(Debug, Default)]
pub struct LocalExecutor {
    on_path: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl LocalExecutor {
    /// Pretend `program` is on PATH.
    pub fn allow(&self, program: &str) {
        self.on_path.lock().unwrap().insert(program.to_string());
    }

    /// Non-git commands run so far, as `"program arg1 arg2"`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, program: &str, args: &[&str]) -> ExecResult {
        let line = std::iter::once(program)
            .chain(args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ");
        self.calls.lock().unwrap().push(line);
        ExecResult {
            stdout: String::new(),
            stderr: String::new(),
            success: true,
            code: Some(0),
        }
    }
}

impl Executor for LocalExecutor {
    fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        if program == "git" {
            return SystemExecutor.run(program, args);
        }
        Ok(self.record(program, args))
    }

    fn run_in(&self, dir: &Path, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        if program == "git" {
            return SystemExecutor.run_in(dir, program, args);
        }
        Ok(self.record(program, args))
    }

    fn run_in_with_env(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
        env: &[(&str, &str)],
    ) -> anyhow::Result<ExecResult> {
        if program == "git" {
            return SystemExecutor.run_in_with_env(dir, program, args, env);
        }
        Ok(self.record(program, args))
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        if program == "git" {
            return SystemExecutor.run_unchecked(program, args);
        }
        Ok(self.record(program, args))
    }

    fn run_in_unchecked(
        &self,
        dir: &Path,
        program: &str,
        args: &[&str],
    ) -> anyhow::Result<ExecResult> {
        if program == "git" {
            return SystemExecutor.run_in_unchecked(dir, program, args);
        }
        Ok(self.record(program, args))
    }

    fn run_interactive(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
        Ok(self.record(program, args))
    }

    fn which(&self, program: &str) -> bool {
        program == "git" || self.on_path.lock().unwrap().contains(program)
    }
}

// ---- prompts

/// One canned prompt answer.
#[derive(Debug, Clone)]
pub enum Reply {
    Choose(Option<String>),
    ChooseMany(Option<Vec<String>>),
    Input(Option<String>),
    Confirm(Option<bool>),
}

/// Shorthand for a single-choice answer.
pub fn choose(label: &str) -> Reply {
    Reply::Choose(Some(label.to_string()))
}

/// Shorthand for a multi-choice answer.
pub fn many(labels: &[&str]) -> Reply {
    Reply::ChooseMany(Some(labels.iter().map(|l| (*l).to_string()).collect()))
}

/// Prompter that replays answers in order and records styled output.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    replies: Mutex<VecDeque<Reply>>,
    asked: Mutex<Vec<String>>,
    notices: Mutex<Vec<String>>,
}

impl ScriptedPrompter {
    pub fn script(&self, replies: impl IntoIterator<Item = Reply>) {
        self.replies.lock().unwrap().extend(replies);
    }

    /// Headers of every prompt shown, in order.
    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().unwrap().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    fn next(&self, header: &str) -> anyhow::Result<Reply> {
        self.asked.lock().unwrap().push(header.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("unexpected prompt: {header}"))
    }
}

impl Prompter for ScriptedPrompter {
    fn choose(&self, header: &str, _: &[&str]) -> anyhow::Result<Option<String>> {
        match self.next(header)? {
            Reply::Choose(answer) => Ok(answer),
            other => anyhow::bail!("expected choose for '{header}', scripted {other:?}"),
        }
    }

    fn choose_many(&self, header: &str, _: &[&str]) -> anyhow::Result<Option<Vec<String>>> {
        match self.next(header)? {
            Reply::ChooseMany(answer) => Ok(answer),
            other => anyhow::bail!("expected choose_many for '{header}', scripted {other:?}"),
        }
    }

    fn input(&self, header: &str, _: &str) -> anyhow::Result<Option<String>> {
        match self.next(header)? {
            Reply::Input(answer) => Ok(answer),
            other => anyhow::bail!("expected input for '{header}', scripted {other:?}"),
        }
    }

    fn confirm(&self, question: &str) -> anyhow::Result<Option<bool>> {
        match self.next(question)? {
            Reply::Confirm(answer) => Ok(answer),
            other => anyhow::bail!("expected confirm for '{question}', scripted {other:?}"),
        }
    }

    fn styled(&self, text: &str, _: TextStyle) -> anyhow::Result<()> {
        self.notices.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

// ---- log

/// [`Log`] that keeps messages and installer results in memory.
#[derive(Debug, Default)]
pub struct RecordingLog {
    messages: Mutex<Vec<(String, String)>>,
    tasks: Mutex<Vec<TaskEntry>>,
}

impl RecordingLog {
    /// Messages logged at `level`.
    pub fn at(&self, level: &str) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// `(name, status)` of every recorded installer.
    pub fn statuses(&self) -> Vec<(String, TaskStatus)> {
        self.tasks
            .lock()
            .unwrap()
            .iter()
            .map(|t| (t.name.clone(), t.status))
            .collect()
    }

    fn push(&self, level: &str, msg: &str) {
        self.messages
            .lock()
            .unwrap()
            .push((level.to_string(), msg.to_string()));
    }
}

impl Log for RecordingLog {
    fn stage(&self, msg: &str) {
        self.push("stage", msg);
    }
    fn info(&self, msg: &str) {
        self.push("info", msg);
    }
    fn debug(&self, msg: &str) {
        self.push("debug", msg);
    }
    fn warn(&self, msg: &str) {
        self.push("warn", msg);
    }
    fn error(&self, msg: &str) {
        self.push("error", msg);
    }
    fn record_task(&self, name: &str, status: TaskStatus, message: Option<&str>) {
        self.tasks.lock().unwrap().push(TaskEntry {
            name: name.to_string(),
            status,
            message: message.map(String::from),
        });
    }
}

// ---- environment

/// Default content of each upstream repository.
pub fn default_upstream_files(name: &str) -> Vec<(&'static str, &'static str)> {
    match name {
        "shell" => vec![("shell.qml", "import Quickshell\nShellRoot {}\n")],
        "cli" | "settings" => vec![
            ("Cargo.toml", "[package]\nname = \"companion\"\n"),
            ("src/main.rs", "fn main() {}\n"),
        ],
        "themes" => vec![
            ("kitty/theme.conf", "background #1f2937\n"),
            (
                "bar/Bar.qml",
                "pragma ComponentBehavior: Bound\nimport QtQuick\nItem {}\n",
            ),
            ("Makefile", "all:\n"),
        ],
        "editor" => vec![
            ("package.json", "{\"name\": \"dotsetup-theme\"}\n"),
            ("themes/dark.json", "{}\n"),
            ("src/extension.ts", "export {}\n"),
        ],
        _ => vec![],
    }
}

/// A temporary home, upstream repositories for every managed repository
/// and doubles wired into a [`Context`].
#[derive(Debug)]
pub struct Harness {
    /// Owns every path below.
    pub dir: tempfile::TempDir,
    /// Configuration pointing repository URLs at the local upstreams.
    pub config: Config,
    /// Upstream for each managed repository, by name.
    pub upstreams: Vec<(String, Upstream)>,
    pub executor: Arc<LocalExecutor>,
    pub prompt: Arc<ScriptedPrompter>,
    pub log: Arc<RecordingLog>,
}

impl Harness {
    /// Fresh home with one upstream per managed repository.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let home = dir.path().join("home");
        std::fs::create_dir_all(&home).expect("create home");
        let mut config = Config::defaults(&BaseDirs::from_home(&home));

        let mut upstreams = Vec::new();
        for spec in &mut config.repositories {
            let files = default_upstream_files(&spec.name);
            let upstream = Upstream::create(&dir.path().join("upstream").join(&spec.name), &files);
            spec.url = upstream.url();
            upstreams.push((spec.name.clone(), upstream));
        }

        Self {
            dir,
            config,
            upstreams,
            executor: Arc::default(),
            prompt: Arc::default(),
            log: Arc::default(),
        }
    }

    /// Upstream repository called `name`.
    pub fn upstream(&self, name: &str) -> &Upstream {
        self.upstreams
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, u)| u)
            .expect("known upstream")
    }

    /// Home directory.
    pub fn home(&self) -> &Path {
        &self.config.home
    }

    /// Local working tree of the managed repository `name`.
    pub fn local(&self, name: &str) -> PathBuf {
        self.config.repo_path(name)
    }

    /// Git backend over the harness executor.
    pub fn vcs(&self) -> Arc<GitCli> {
        Arc::new(GitCli::new(Arc::clone(&self.executor) as Arc<dyn Executor>))
    }

    /// Interactive context over the harness doubles and real git.
    pub fn context(&self) -> Context {
        Context::new(
            Arc::new(self.config.clone()),
            Arc::clone(&self.log) as Arc<dyn Log>,
            Arc::clone(&self.executor) as Arc<dyn Executor>,
            self.vcs() as Arc<dyn VersionControl>,
            Arc::clone(&self.prompt) as Arc<dyn Prompter>,
        )
    }

    /// Put the prerequisite tools on the simulated PATH.
    pub fn with_prerequisites(self) -> Self {
        for tool in ["paru", "gum"] {
            self.executor.allow(tool);
        }
        self
    }
}
