// src/engine/completion.rs

//! Aggregate completion of a dispatch pass.

use std::path::Path;

use tracing::{debug, warn};

use crate::engine::dispatch::DispatchedTask;
use crate::engine::task::SettleError;
use crate::errors::{Result, TaskrouteError};
use crate::path_utils::match_subject;

/// Fold over the dispatched tasks in discovery order.
///
/// Equivalent to `ok.then(|| h1).then(|| h2)...`: task `n` is only observed
/// once task `n - 1` has settled, even though all of them were started
/// eagerly and may have finished in any order.
///
/// The fold stops at the first failure. Tasks after it are never awaited;
/// they keep running detached. Returns the number of tasks settled.
pub async fn settle_in_order(tasks: Vec<DispatchedTask>) -> Result<usize> {
    let total = tasks.len();
    let mut settled = 0;

    for task in tasks {
        let (path, handle) = task.into_parts();

        if let Err(err) = handle.settle().await {
            let err = action_error(&path, err);
            warn!(error = %err, settled, total, "completion fold stopped");
            return Err(err);
        }

        settled += 1;
        debug!(path = %match_subject(&path), settled, total, "task settled");
    }

    Ok(settled)
}

/// Attach the file path to a failed settlement.
pub(crate) fn action_error(path: &Path, err: SettleError) -> TaskrouteError {
    let path = match_subject(path);
    match err {
        SettleError::Failed(err) => TaskrouteError::ActionFailed {
            path,
            message: format!("{err:#}"),
        },
        SettleError::Aborted(_) => TaskrouteError::ActionPanicked { path },
    }
}
