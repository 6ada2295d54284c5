// src/engine/hooks.rs

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::engine::context::RunContext;
use crate::engine::task::{Hook, SettleError, TaskHandle};
use crate::errors::{HookKind, Result, TaskrouteError};

/// Optional `before` / `after` hooks. A missing hook behaves as a no-op.
#[derive(Clone, Default)]
pub struct Hooks {
    before: Option<Arc<dyn Hook>>,
    after: Option<Arc<dyn Hook>>,
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Hooks")
            .field("before", &self.before.is_some())
            .field("after", &self.after.is_some())
            .finish()
    }
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_before(mut self, hook: impl Hook + 'static) -> Self {
        self.before = Some(Arc::new(hook));
        self
    }

    pub fn with_after(mut self, hook: impl Hook + 'static) -> Self {
        self.after = Some(Arc::new(hook));
        self
    }

    pub fn has_before(&self) -> bool {
        self.before.is_some()
    }

    pub fn has_after(&self) -> bool {
        self.after.is_some()
    }

    /// Invoke `before` and wait for it to settle.
    pub async fn run_before(&self, ctx: &RunContext) -> Result<()> {
        run_hook(self.before.as_ref(), HookKind::Before, ctx).await
    }

    /// Invoke `after` and wait for it to settle.
    pub async fn run_after(&self, ctx: &RunContext) -> Result<()> {
        run_hook(self.after.as_ref(), HookKind::After, ctx).await
    }
}

async fn run_hook(hook: Option<&Arc<dyn Hook>>, kind: HookKind, ctx: &RunContext) -> Result<()> {
    let Some(hook) = hook else {
        return Ok(());
    };

    debug!(hook = %kind, run_id = ctx.run_id(), "running hook");
    match TaskHandle::start(hook.call(ctx)).settle().await {
        Ok(()) => Ok(()),
        Err(SettleError::Failed(err)) => Err(TaskrouteError::HookFailed {
            hook: kind,
            message: format!("{err:#}"),
        }),
        Err(SettleError::Aborted(join_err)) => Err(TaskrouteError::HookFailed {
            hook: kind,
            message: join_err.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{hook_fn, TaskOutput};
    use crate::types::RunOptions;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn absent_hooks_are_noops() {
        let ctx = RunContext::new(1, RunOptions::default());
        let hooks = Hooks::new();
        assert!(hooks.run_before(&ctx).await.is_ok());
        assert!(hooks.run_after(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn hook_failures_name_the_hook() {
        let ctx = RunContext::new(1, RunOptions::default());
        let hooks = Hooks::new().with_after(hook_fn(|_| TaskOutput::failed(anyhow!("disk full"))));

        match hooks.run_after(&ctx).await {
            Err(TaskrouteError::HookFailed { hook, message }) => {
                assert_eq!(hook, HookKind::After);
                assert!(message.contains("disk full"));
            }
            other => panic!("expected HookFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn async_hook_is_awaited() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let hooks = Hooks::new().with_before(hook_fn(move |_| {
            let seen = Arc::clone(&seen);
            TaskOutput::pending(async move {
                tokio::task::yield_now().await;
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
        }));

        hooks
            .run_before(&RunContext::new(7, RunOptions::default()))
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
