// src/watch/supervisor.rs

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::engine::{Hooks, RunContext};
use crate::fs::FileSystem;
use crate::path_utils::match_subject;
use crate::rules::{Rule, RuleMatch};
use crate::watch::poller::{poll_file, PollerShared, WatchRegistration};
use crate::watch::repo_state::RepoState;

/// Default poll interval for watched files.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Smallest accepted poll interval.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Owns the watch registrations created by a dispatch pass.
///
/// Each registration runs as its own poller task. Pollers live as long as
/// the supervisor: dropping it aborts them all (re-runs already in flight
/// are left to finish).
pub struct WatchSupervisor {
    root: PathBuf,
    shared: Arc<PollerShared>,
    pollers: HashMap<PathBuf, JoinHandle<()>>,
}

impl fmt::Debug for WatchSupervisor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchSupervisor")
            .field("root", &self.root)
            .field("interval", &self.shared.interval)
            .field("watched", &self.pollers.len())
            .finish()
    }
}

impl WatchSupervisor {
    pub(crate) fn new(
        ctx: RunContext,
        hooks: Hooks,
        root: PathBuf,
        fs: Arc<dyn FileSystem>,
        repo: Arc<dyn RepoState>,
        interval: Duration,
    ) -> Self {
        Self {
            root,
            shared: Arc::new(PollerShared {
                ctx,
                hooks,
                fs,
                repo,
                interval: interval.max(MIN_POLL_INTERVAL),
            }),
            pollers: HashMap::new(),
        }
    }

    /// Start polling the file behind `rule_match`.
    ///
    /// Registrations are keyed by path. A second install for a path that is
    /// already watched is refused (returns `false`) and the existing poller
    /// is kept.
    pub fn install(&mut self, rule: Rule, rule_match: RuleMatch) -> bool {
        let path = rule_match.path().to_path_buf();
        let subject = match_subject(&path);

        if self.pollers.contains_key(&path) {
            warn!(path = %subject, "file is already watched; keeping the first registration");
            return false;
        }

        let disk_path = self.root.join(&path);
        let last_known_mtime = self.shared.fs.modified(&disk_path).ok();
        if last_known_mtime.is_none() {
            debug!(path = %subject, "watched file has no readable mtime yet");
        }

        let registration = WatchRegistration {
            path: path.clone(),
            disk_path,
            rule,
            rule_match,
            last_known_mtime,
        };

        let handle = tokio::spawn(poll_file(registration, Arc::clone(&self.shared)));
        self.pollers.insert(path, handle);
        debug!(path = %subject, "watch registration installed");
        true
    }

    pub fn is_watching(&self, path: &Path) -> bool {
        self.pollers.contains_key(path)
    }

    pub fn watched(&self) -> impl Iterator<Item = &Path> {
        self.pollers.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.pollers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pollers.is_empty()
    }

    pub fn poll_interval(&self) -> Duration {
        self.shared.interval
    }
}

impl Drop for WatchSupervisor {
    fn drop(&mut self) {
        if !self.pollers.is_empty() {
            info!(watched = self.pollers.len(), "stopping file pollers");
        }
        for (_, handle) in self.pollers.drain() {
            handle.abort();
        }
    }
}
