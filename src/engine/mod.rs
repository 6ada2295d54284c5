// src/engine/mod.rs

//! Orchestration engine.
//!
//! - [`pending`]: the tombstoned working set of files.
//! - [`task`]: actions, hooks, and the normalised [`TaskHandle`].
//! - [`dispatch`]: the rule-major sweep that routes files to actions.
//! - [`completion`]: the in-order settlement fold over a pass.
//! - [`hooks`]: optional `before` / `after`.
//! - [`context`]: the per-run value handed to actions and hooks.
//! - [`orchestrator`]: ties the above together for one top-level run.

pub mod completion;
pub mod context;
pub mod dispatch;
pub mod hooks;
pub mod orchestrator;
pub mod pending;
pub mod task;

pub use completion::settle_in_order;
pub use context::{RunContext, Trigger};
pub use dispatch::{dispatch, plan_routes, DispatchedTask, PlannedRoute};
pub use hooks::Hooks;
pub use orchestrator::{Orchestrator, RunReport};
pub use pending::PendingSet;
pub use task::{
    action_fn, hook_fn, Action, FnAction, FnHook, Hook, SettleError, TaskFuture, TaskHandle,
    TaskOutput,
};
