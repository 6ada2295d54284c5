// src/engine/task.rs

//! Actions, hooks and the normalised handle for one invocation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use tokio::task::{JoinError, JoinHandle};

use crate::engine::context::RunContext;
use crate::rules::RuleMatch;

/// Future returned by an asynchronous action or hook.
pub type TaskFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'static>>;

/// What an action or hook hands back: either a plain, already-known
/// result or a future that settles later.
pub enum TaskOutput {
    Ready(anyhow::Result<()>),
    Pending(TaskFuture),
}

impl TaskOutput {
    /// A plain successful value.
    pub fn done() -> Self {
        TaskOutput::Ready(Ok(()))
    }

    /// A plain failure.
    pub fn failed(err: impl Into<anyhow::Error>) -> Self {
        TaskOutput::Ready(Err(err.into()))
    }

    pub fn pending<F>(fut: F) -> Self
    where
        F: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        TaskOutput::Pending(Box::pin(fut))
    }
}

impl From<anyhow::Result<()>> for TaskOutput {
    fn from(res: anyhow::Result<()>) -> Self {
        TaskOutput::Ready(res)
    }
}

impl fmt::Debug for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutput::Ready(res) => f.debug_tuple("Ready").field(&res.is_ok()).finish(),
            TaskOutput::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// A rule's action, invoked once per matched file (and again for every
/// watch-triggered re-run of that file).
pub trait Action: Send + Sync {
    fn invoke(&self, ctx: &RunContext, rule_match: &RuleMatch) -> TaskOutput;
}

/// A lifecycle hook (`before` / `after`).
pub trait Hook: Send + Sync {
    fn call(&self, ctx: &RunContext) -> TaskOutput;
}

/// Adapter returned by [`action_fn`].
#[derive(Clone)]
pub struct FnAction<F>(F);

impl<F> Action for FnAction<F>
where
    F: Fn(&RunContext, &RuleMatch) -> TaskOutput + Send + Sync,
{
    fn invoke(&self, ctx: &RunContext, rule_match: &RuleMatch) -> TaskOutput {
        (self.0)(ctx, rule_match)
    }
}

/// Build an [`Action`] from a closure.
pub fn action_fn<F>(f: F) -> FnAction<F>
where
    F: Fn(&RunContext, &RuleMatch) -> TaskOutput + Send + Sync,
{
    FnAction(f)
}

/// Adapter returned by [`hook_fn`].
#[derive(Clone)]
pub struct FnHook<F>(F);

impl<F> Hook for FnHook<F>
where
    F: Fn(&RunContext) -> TaskOutput + Send + Sync,
{
    fn call(&self, ctx: &RunContext) -> TaskOutput {
        (self.0)(ctx)
    }
}

/// Build a [`Hook`] from a closure.
pub fn hook_fn<F>(f: F) -> FnHook<F>
where
    F: Fn(&RunContext) -> TaskOutput + Send + Sync,
{
    FnHook(f)
}

/// Why a handle did not settle successfully.
#[derive(Debug)]
pub enum SettleError {
    /// The action or hook reported an error.
    Failed(anyhow::Error),
    /// The spawned task panicked or was aborted.
    Aborted(JoinError),
}

/// Normalised, already-started form of a [`TaskOutput`].
///
/// Pending outputs are spawned onto the runtime as soon as the handle is
/// created, so the work makes progress whether or not anyone is awaiting
/// the handle yet.
pub struct TaskHandle {
    state: HandleState,
}

enum HandleState {
    Ready(anyhow::Result<()>),
    Spawned(JoinHandle<anyhow::Result<()>>),
}

impl TaskHandle {
    /// Must be called from within a Tokio runtime.
    pub fn start(output: TaskOutput) -> Self {
        let state = match output {
            TaskOutput::Ready(res) => HandleState::Ready(res),
            TaskOutput::Pending(fut) => HandleState::Spawned(tokio::spawn(fut)),
        };
        Self { state }
    }

    pub fn is_ready(&self) -> bool {
        match &self.state {
            HandleState::Ready(_) => true,
            HandleState::Spawned(join) => join.is_finished(),
        }
    }

    /// Wait for the invocation to settle.
    pub async fn settle(self) -> std::result::Result<(), SettleError> {
        match self.state {
            HandleState::Ready(res) => res.map_err(SettleError::Failed),
            HandleState::Spawned(join) => match join.await {
                Ok(res) => res.map_err(SettleError::Failed),
                Err(join_err) => Err(SettleError::Aborted(join_err)),
            },
        }
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.state {
            HandleState::Ready(_) => "ready",
            HandleState::Spawned(_) => "spawned",
        };
        f.debug_struct("TaskHandle")
            .field("kind", &kind)
            .field("finished", &self.is_ready())
            .finish()
    }
}
