//! Managed PATH lines in the shell rc files.

use anyhow::Result;

use super::helpers::{any_rc_file, append_rc_line};
use super::{Context, Task, TaskResult};

/// Lines every managed shell rc file carries.
pub const MANAGED_LINES: &[&str] = &[r#"export PATH="$HOME/.local/bin:$PATH""#];

/// Append the managed PATH lines to the user's existing shell rc files.
#[derive(Debug)]
pub struct ConfigureShellRc;

impl Task for ConfigureShellRc {
    fn name(&self) -> &'static str {
        "Shell rc"
    }

    fn should_run(&self, ctx: &Context) -> bool {
        any_rc_file(ctx)
    }

    fn run(&self, ctx: &Context) -> Result<TaskResult> {
        let mut appended = 0;
        for line in MANAGED_LINES {
            appended += append_rc_line(ctx, line)?;
        }
        if appended == 0 {
            ctx.log.debug("shell rc files already configured");
        }
        Ok(TaskResult::Ok)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::logging::TaskStatus;
    use crate::tasks::execute;
    use crate::tasks::test_helpers::TestEnv;

    #[test]
    fn not_applicable_without_rc_files() {
        let env = TestEnv::new();
        assert_eq!(execute(&ConfigureShellRc, &env.context()), TaskStatus::Skipped);
    }

    #[test]
    fn appends_to_both_rc_files_once() {
        let env = TestEnv::new();
        std::fs::write(env.home().join(".bashrc"), "# bash\n").unwrap();
        std::fs::write(env.home().join(".zshrc"), "# zsh\n").unwrap();
        let ctx = env.context();

        ConfigureShellRc.run(&ctx).unwrap();
        ConfigureShellRc.run(&ctx).unwrap();
        for rc in [".bashrc", ".zshrc"] {
            let content = std::fs::read_to_string(env.home().join(rc)).unwrap();
            assert_eq!(content.matches(".local/bin").count(), 1, "{rc}");
        }
    }
}
