// src/engine/dispatch.rs

//! The dispatch pass: route every pending file to the first rule that
//! matches it.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::engine::context::RunContext;
use crate::engine::pending::PendingSet;
use crate::engine::task::TaskHandle;
use crate::rules::{Rule, RuleMatch};
use crate::watch::WatchSupervisor;

/// One action invocation started by a dispatch pass.
#[derive(Debug)]
pub struct DispatchedTask {
    path: PathBuf,
    rule_index: usize,
    handle: TaskHandle,
}

impl DispatchedTask {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Position of the rule in declaration order.
    pub fn rule_index(&self) -> usize {
        self.rule_index
    }

    pub(crate) fn into_parts(self) -> (PathBuf, TaskHandle) {
        (self.path, self.handle)
    }
}

/// A file the dry-run planner assigned to a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedRoute {
    pub path: PathBuf,
    pub rule_index: usize,
    pub pattern: String,
}

/// Core sweep shared by the real pass and the planner.
///
/// Rules are visited in declaration order; for each rule the pending set is
/// walked by position, skipping tombstones. A matching file is taken out of
/// the set before `on_match` runs, so no later rule can see it again.
pub(crate) fn sweep<F>(rules: &[Rule], pending: &mut PendingSet, mut on_match: F)
where
    F: FnMut(usize, &Rule, RuleMatch),
{
    for (rule_index, rule) in rules.iter().enumerate() {
        for pos in 0..pending.capacity() {
            let Some(path) = pending.get(pos) else {
                continue;
            };
            let Some(rule_match) = rule.match_path(path) else {
                continue;
            };
            pending.take(pos);
            on_match(rule_index, rule, rule_match);
        }
    }
}

/// Run a dispatch pass.
///
/// Each matched file's action is invoked immediately and its output started
/// as a [`TaskHandle`]; nothing here waits for an action to finish. When a
/// supervisor is given, every matched file also gets a watch registration.
///
/// The returned tasks are in discovery order, which is the order the
/// completion fold observes them in.
pub fn dispatch(
    ctx: &RunContext,
    rules: &[Rule],
    pending: &mut PendingSet,
    mut supervisor: Option<&mut WatchSupervisor>,
) -> Vec<DispatchedTask> {
    let mut dispatched = Vec::new();

    sweep(rules, pending, |rule_index, rule, rule_match| {
        debug!(
            run_id = ctx.run_id(),
            path = %rule_match.subject(),
            pattern = %rule.pattern(),
            "dispatching file"
        );

        let handle = TaskHandle::start(rule.invoke(ctx, &rule_match));
        let path = rule_match.path().to_path_buf();

        if let Some(supervisor) = supervisor.as_deref_mut() {
            supervisor.install(rule.clone(), rule_match);
        }

        dispatched.push(DispatchedTask {
            path,
            rule_index,
            handle,
        });
    });

    info!(
        run_id = ctx.run_id(),
        dispatched = dispatched.len(),
        unmatched = pending.remaining_count(),
        "dispatch pass complete"
    );
    dispatched
}

/// Compute which rule each pending file would be routed to, without
/// invoking anything or touching `pending`.
pub fn plan_routes(rules: &[Rule], pending: &PendingSet) -> Vec<PlannedRoute> {
    let mut scratch = pending.clone();
    let mut plan = Vec::new();
    sweep(rules, &mut scratch, |rule_index, rule, rule_match| {
        plan.push(PlannedRoute {
            path: rule_match.path().to_path_buf(),
            rule_index,
            pattern: rule.pattern().to_string(),
        });
    });
    plan
}
