// src/watch/mod.rs

//! Watch mode: keep re-running actions for files whose modification time
//! changes.
//!
//! - [`supervisor`] owns one poller per watched file.
//! - [`poller`] samples modification times, applies the guards (unchanged
//!   timestamp, repository mid-rebase) and sequences each re-run.
//! - [`repo_state`] answers "is a rebase in progress?".
//!
//! It knows nothing about the initial dispatch pass or its completion
//! fold; every re-run has its own `before` / action / `after` sequence.

pub mod poller;
pub mod repo_state;
pub mod supervisor;

pub use poller::{evaluate_sample, rerun, PollDecision, WatchRegistration};
pub use repo_state::{GitRepoState, NoRepository, RepoState};
pub use supervisor::{WatchSupervisor, DEFAULT_POLL_INTERVAL, MIN_POLL_INTERVAL};
