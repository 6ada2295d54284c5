// src/exec/command.rs

//! Shell-command actions and hooks.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info};

use crate::engine::{Action, Hook, RunContext, TaskOutput};
use crate::errors::HookKind;
use crate::path_utils::match_subject;
use crate::rules::RuleMatch;

/// Runs a shell command for every file routed to its rule.
///
/// The command sees the run context and the match as environment
/// variables (`TASKROUTE_PATH`, `TASKROUTE_MATCH`, `TASKROUTE_CAPTURE_<n>`,
/// plus the variables listed on [`context_env`]).
#[derive(Debug, Clone)]
pub struct CommandAction {
    cmd: String,
    workdir: PathBuf,
}

impl CommandAction {
    pub fn new(cmd: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            cmd: cmd.into(),
            workdir: workdir.into(),
        }
    }

    pub fn cmd(&self) -> &str {
        &self.cmd
    }
}

impl Action for CommandAction {
    fn invoke(&self, ctx: &RunContext, rule_match: &RuleMatch) -> TaskOutput {
        let mut env = context_env(ctx);
        env.push(("TASKROUTE_PATH".into(), rule_match.subject().to_string()));
        env.push(("TASKROUTE_MATCH".into(), rule_match.as_str().to_string()));
        for (i, group) in rule_match.groups().iter().enumerate().skip(1) {
            if let Some(text) = group {
                env.push((format!("TASKROUTE_CAPTURE_{i}"), text.clone()));
            }
        }

        let label = match_subject(rule_match.path());
        TaskOutput::pending(run_shell(self.cmd.clone(), self.workdir.clone(), env, label))
    }
}

/// Runs a shell command as a `before` or `after` hook.
#[derive(Debug, Clone)]
pub struct CommandHook {
    kind: HookKind,
    cmd: String,
    workdir: PathBuf,
}

impl CommandHook {
    pub fn new(kind: HookKind, cmd: impl Into<String>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            cmd: cmd.into(),
            workdir: workdir.into(),
        }
    }
}

impl Hook for CommandHook {
    fn call(&self, ctx: &RunContext) -> TaskOutput {
        let mut env = context_env(ctx);
        env.push(("TASKROUTE_HOOK".into(), self.kind.to_string()));
        let label = format!("{} hook", self.kind);
        TaskOutput::pending(run_shell(self.cmd.clone(), self.workdir.clone(), env, label))
    }
}

/// Environment describing the run context, shared by actions and hooks:
/// `TASKROUTE_RUN_ID`, `TASKROUTE_TRIGGER` (`initial` / `watch`),
/// `TASKROUTE_WATCH` and `TASKROUTE_COMMIT` (`0` / `1`).
pub fn context_env(ctx: &RunContext) -> Vec<(String, String)> {
    let flag = |b: bool| String::from(if b { "1" } else { "0" });
    let trigger = if ctx.is_watch_rerun() { "watch" } else { "initial" };
    vec![
        ("TASKROUTE_RUN_ID".into(), ctx.run_id().to_string()),
        ("TASKROUTE_TRIGGER".into(), trigger.to_string()),
        ("TASKROUTE_WATCH".into(), flag(ctx.options().watch)),
        ("TASKROUTE_COMMIT".into(), flag(ctx.options().commit)),
    ]
}

/// Build a shell command appropriate for the platform.
fn shell_command(cmd: &str) -> Command {
    if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmd);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmd);
        c
    }
}

async fn run_shell(
    cmd: String,
    workdir: PathBuf,
    env: Vec<(String, String)>,
    label: String,
) -> Result<()> {
    info!(task = %label, cmd = %cmd, "starting command");

    let mut command = shell_command(&cmd);
    command
        .current_dir(&workdir)
        .envs(env)
        .stdout(Stdio::inherit())
        .stderr(Stdio::piped());

    let mut child = command
        .spawn()
        .with_context(|| format!("spawning `{cmd}` for {label}"))?;

    // Always consume stderr so buffers don't fill; log at debug.
    if let Some(stderr) = child.stderr.take() {
        let label = label.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %label, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for `{cmd}` ({label})"))?;

    let code = status.code().unwrap_or(-1);
    info!(task = %label, exit_code = code, success = status.success(), "command exited");

    if !status.success() {
        bail!("`{cmd}` exited with status {code}");
    }
    Ok(())
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::engine::TaskHandle;
    use crate::rules::{compile_rules, RuleMap};
    use crate::types::RunOptions;
    use std::path::Path;

    fn match_for(pattern: &str, path: &str) -> RuleMatch {
        let map = RuleMap::new().with(pattern, CommandAction::new("true", "."));
        let rules = compile_rules(&map).unwrap();
        rules[0].match_path(Path::new(path)).unwrap()
    }

    #[tokio::test]
    async fn exports_match_and_context() {
        let dir = tempfile::tempdir().unwrap();
        let action = CommandAction::new(
            r#"test "$TASKROUTE_PATH" = "src/a.src" && test "$TASKROUTE_CAPTURE_1" = "a" && test "$TASKROUTE_TRIGGER" = "initial" && test "$TASKROUTE_COMMIT" = "0""#,
            dir.path(),
        );
        let ctx = RunContext::new(1, RunOptions::default());
        let m = match_for(r"(\w+)\.src$", "./src/a.src");

        let res = TaskHandle::start(action.invoke(&ctx, &m)).settle().await;
        assert!(res.is_ok(), "{res:?}");
    }

    #[tokio::test]
    async fn non_zero_exit_is_a_failure() {
        let action = CommandAction::new("exit 3", ".");
        let ctx = RunContext::new(1, RunOptions::default());
        let m = match_for(r"\.md$", "b.md");

        match TaskHandle::start(action.invoke(&ctx, &m)).settle().await {
            Err(crate::engine::SettleError::Failed(err)) => {
                assert!(err.to_string().contains("status 3"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn watch_rerun_exports_watch_trigger() {
        let action = CommandAction::new(r#"test "$TASKROUTE_TRIGGER" = "watch""#, ".");
        let ctx = RunContext::new(3, RunOptions::default()).for_file_watch(Path::new("b.md"));
        let m = match_for(r"\.md$", "b.md");

        assert!(TaskHandle::start(action.invoke(&ctx, &m)).settle().await.is_ok());
    }

    #[tokio::test]
    async fn hook_sees_its_kind() {
        let hook = CommandHook::new(HookKind::After, r#"test "$TASKROUTE_HOOK" = "after""#, ".");
        let ctx = RunContext::new(2, RunOptions::default());
        assert!(TaskHandle::start(hook.call(&ctx)).settle().await.is_ok());
    }
}
