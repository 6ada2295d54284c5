// src/watch/poller.rs

//! Per-file modification-time poller and the re-run it triggers.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::engine::completion::action_error;
use crate::engine::{Hooks, RunContext, TaskHandle};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::path_utils::match_subject;
use crate::rules::{Rule, RuleMatch};
use crate::watch::repo_state::RepoState;

/// Outcome of one poll sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollDecision {
    /// Same modification time as last sample.
    Unchanged,
    /// Changed, but a rebase is in progress.
    SuppressedRebase,
    /// Changed; a re-run should start.
    Changed,
}

/// Apply the watch guards to a new sample.
///
/// `None` means the file could not be stat'ed. The last known value is
/// always replaced by `current`, so a change observed mid-rebase is
/// consumed and will not fire once the rebase ends. `is_rebasing` is only
/// consulted when the timestamp actually moved.
pub fn evaluate_sample<F>(
    last_known: &mut Option<SystemTime>,
    current: Option<SystemTime>,
    is_rebasing: F,
) -> PollDecision
where
    F: FnOnce() -> bool,
{
    if *last_known == current {
        return PollDecision::Unchanged;
    }
    *last_known = current;

    if is_rebasing() {
        PollDecision::SuppressedRebase
    } else {
        PollDecision::Changed
    }
}

/// State for one watched file, created once per matched file.
#[derive(Debug, Clone)]
pub struct WatchRegistration {
    /// Path as it appeared in the pending set.
    pub path: PathBuf,
    /// Where the poller stats the file (`root` joined with `path`).
    pub disk_path: PathBuf,
    pub rule: Rule,
    pub rule_match: RuleMatch,
    pub last_known_mtime: Option<SystemTime>,
}

/// Everything a poller shares with its supervisor.
#[derive(Debug)]
pub(crate) struct PollerShared {
    pub ctx: RunContext,
    pub hooks: Hooks,
    pub fs: Arc<dyn FileSystem>,
    pub repo: Arc<dyn RepoState>,
    pub interval: Duration,
}

/// Poll one file forever. The supervisor aborts this task on drop.
pub(crate) async fn poll_file(mut reg: WatchRegistration, shared: Arc<PollerShared>) {
    let mut ticker = tokio::time::interval(shared.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the install-time sample covers it.
    ticker.tick().await;

    let subject = match_subject(&reg.path);

    loop {
        ticker.tick().await;

        let current = shared.fs.modified(&reg.disk_path).ok();
        let decision = evaluate_sample(&mut reg.last_known_mtime, current, || {
            shared.repo.is_rebasing()
        });

        match decision {
            PollDecision::Unchanged => {}
            PollDecision::SuppressedRebase => {
                debug!(path = %subject, "change ignored: repository is mid-rebase");
            }
            PollDecision::Changed => {
                info!(path = %subject, "watched file changed; re-running action");
                let ctx = shared.ctx.for_file_watch(&reg.path);
                let hooks = shared.hooks.clone();
                let rule = reg.rule.clone();
                let rule_match = reg.rule_match.clone();
                let subject = subject.clone();

                tokio::spawn(async move {
                    if let Err(err) = rerun(&ctx, &hooks, &rule, &rule_match).await {
                        warn!(path = %subject, error = %err, "watch re-run failed");
                    }
                });
            }
        }
    }
}

/// One watch-triggered re-run: fresh `before`, the rule's action with the
/// original match, fresh `after`. A failure ends the sequence.
pub async fn rerun(
    ctx: &RunContext,
    hooks: &Hooks,
    rule: &Rule,
    rule_match: &RuleMatch,
) -> Result<()> {
    hooks.run_before(ctx).await?;

    TaskHandle::start(rule.invoke(ctx, rule_match))
        .settle()
        .await
        .map_err(|err| action_error(rule_match.path(), err))?;

    hooks.run_after(ctx).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(secs: u64) -> Option<SystemTime> {
        Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
    }

    #[test]
    fn unchanged_timestamp_is_a_noop() {
        let mut last = t(1);
        let decision = evaluate_sample(&mut last, t(1), || panic!("must not probe the repo"));
        assert_eq!(decision, PollDecision::Unchanged);
        assert_eq!(last, t(1));
    }

    #[test]
    fn change_outside_rebase_fires() {
        let mut last = t(1);
        assert_eq!(evaluate_sample(&mut last, t(2), || false), PollDecision::Changed);
        assert_eq!(last, t(2));
    }

    #[test]
    fn change_during_rebase_is_suppressed_and_consumed() {
        let mut last = t(1);
        assert_eq!(
            evaluate_sample(&mut last, t(2), || true),
            PollDecision::SuppressedRebase
        );
        // Once the rebase is over the same timestamp does not fire late.
        assert_eq!(evaluate_sample(&mut last, t(2), || false), PollDecision::Unchanged);
    }

    #[test]
    fn disappearing_file_counts_as_change() {
        let mut last = t(3);
        assert_eq!(evaluate_sample(&mut last, None, || false), PollDecision::Changed);
        assert_eq!(evaluate_sample(&mut last, None, || false), PollDecision::Unchanged);
    }
}
