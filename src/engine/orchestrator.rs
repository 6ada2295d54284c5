// src/engine/orchestrator.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::engine::completion::settle_in_order;
use crate::engine::context::RunContext;
use crate::engine::dispatch::{dispatch, plan_routes, PlannedRoute};
use crate::engine::hooks::Hooks;
use crate::engine::pending::PendingSet;
use crate::errors::{Result, TaskrouteError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::rules::{compile_rules, Rule, RuleMap};
use crate::types::RunOptions;
use crate::watch::{
    GitRepoState, RepoState, WatchSupervisor, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL,
};

/// What a top-level run produced.
#[derive(Debug)]
pub struct RunReport {
    pub run_id: u64,
    /// Files handed to an action, in discovery order.
    pub dispatched: Vec<PathBuf>,
    /// First failure seen by the completion fold, or a failing `after`
    /// hook. `None` means every action and the `after` hook succeeded.
    pub failure: Option<TaskrouteError>,
    /// Live pollers when watch mode is on. Dropping it stops watching.
    pub supervisor: Option<WatchSupervisor>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Turn a reported failure into an error, discarding any supervisor.
    pub fn into_result(self) -> Result<Option<WatchSupervisor>> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.supervisor),
        }
    }
}

/// Top-level entry point: compiled rules, hooks and options for running
/// dispatch passes.
///
/// Only one run may be in flight per orchestrator; a concurrent call to
/// [`run`](Self::run) fails with [`TaskrouteError::RunInProgress`].
pub struct Orchestrator {
    rules: Vec<Rule>,
    options: RunOptions,
    hooks: Hooks,
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
    repo: Option<Arc<dyn RepoState>>,
    poll_interval: Duration,
    in_flight: AtomicBool,
    last_run_id: AtomicU64,
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("rules", &self.rules)
            .field("options", &self.options)
            .field("hooks", &self.hooks)
            .field("root", &self.root)
            .field("poll_interval", &self.poll_interval)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Compile `map` and build an orchestrator with default settings: no
    /// hooks, root `.`, the real filesystem, git rebase detection and a
    /// 250 ms poll interval.
    pub fn new(map: &RuleMap, options: RunOptions) -> Result<Self> {
        Ok(Self::from_rules(compile_rules(map)?, options))
    }

    pub fn from_rules(rules: Vec<Rule>, options: RunOptions) -> Self {
        Self {
            rules,
            options,
            hooks: Hooks::default(),
            root: PathBuf::from("."),
            fs: Arc::new(RealFileSystem),
            repo: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            in_flight: AtomicBool::new(false),
            last_run_id: AtomicU64::new(0),
        }
    }

    pub fn with_hooks(mut self, hooks: Hooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Directory the pending paths are relative to, for stat'ing them.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Override repository-state probing (defaults to git discovery from
    /// the root when watch mode starts).
    pub fn with_repo_state(mut self, repo: Arc<dyn RepoState>) -> Self {
        self.repo = Some(repo);
        self
    }

    /// Interval between modification-time samples in watch mode.
    ///
    /// Values below [`MIN_POLL_INTERVAL`] are raised to it; a zero-period
    /// ticker cannot be built.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        if interval < MIN_POLL_INTERVAL {
            warn!(?interval, min = ?MIN_POLL_INTERVAL, "poll interval too small; clamping");
        }
        self.poll_interval = interval.max(MIN_POLL_INTERVAL);
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Dry-run routing of `pending`; nothing is invoked or removed.
    pub fn plan(&self, pending: &PendingSet) -> Vec<PlannedRoute> {
        plan_routes(&self.rules, pending)
    }

    /// Run one top-level pass over `pending`.
    ///
    /// Order of events:
    /// 1. options are validated (watch + commit is fatal, nothing touched);
    /// 2. `before` runs and is awaited (a failure is fatal, nothing touched);
    /// 3. the dispatch pass takes matched files out of `pending` and starts
    ///    their actions, installing watch registrations in watch mode;
    /// 4. the completion fold settles the actions in discovery order;
    /// 5. `after` runs if the fold succeeded.
    ///
    /// Failures from steps 4 and 5 are returned in
    /// [`RunReport::failure`] rather than as `Err`, so a watch-mode caller
    /// still gets its supervisor.
    pub async fn run(&self, pending: &mut PendingSet) -> Result<RunReport> {
        self.options.validate()?;
        let _guard = RunGuard::acquire(&self.in_flight)?;

        let run_id = self.last_run_id.fetch_add(1, Ordering::Relaxed) + 1;
        let ctx = RunContext::new(run_id, self.options.clone());
        info!(
            run_id,
            files = pending.remaining_count(),
            rules = self.rules.len(),
            watch = self.options.watch,
            commit = self.options.commit,
            "starting run"
        );

        self.hooks.run_before(&ctx).await?;

        let mut supervisor = self
            .options
            .watch_enabled()
            .then(|| self.new_supervisor(ctx.clone()));

        let tasks = dispatch(&ctx, &self.rules, pending, supervisor.as_mut());
        let dispatched: Vec<PathBuf> = tasks.iter().map(|t| t.path().to_path_buf()).collect();

        let failure = match settle_in_order(tasks).await {
            Ok(settled) => {
                info!(run_id, settled, "all actions settled");
                self.hooks.run_after(&ctx).await.err()
            }
            Err(err) => Some(err),
        };

        if let Some(err) = &failure {
            warn!(run_id, error = %err, "run finished with a failure");
        } else {
            info!(run_id, dispatched = dispatched.len(), "run finished");
        }

        Ok(RunReport {
            run_id,
            dispatched,
            failure,
            supervisor,
        })
    }

    fn new_supervisor(&self, ctx: RunContext) -> WatchSupervisor {
        let repo = match &self.repo {
            Some(repo) => Arc::clone(repo),
            None => Arc::new(GitRepoState::discover(Arc::clone(&self.fs), &self.root)),
        };
        WatchSupervisor::new(
            ctx,
            self.hooks.clone(),
            self.root.clone(),
            Arc::clone(&self.fs),
            repo,
            self.poll_interval,
        )
    }
}

/// Marks an orchestrator busy for the lifetime of one run.
struct RunGuard<'a>(&'a AtomicBool);

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| TaskrouteError::RunInProgress)?;
        Ok(Self(flag))
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
