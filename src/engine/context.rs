// src/engine/context.rs

use std::path::{Path, PathBuf};

use crate::types::RunOptions;

/// What started the invocation an action or hook is part of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The dispatch pass of a top-level run.
    InitialPass,
    /// A watch poller saw this file change.
    FileWatch { path: PathBuf },
}

/// Configuration in effect for one run, handed explicitly to every action
/// and hook invocation.
///
/// Watch re-runs receive their own copy with [`Trigger::FileWatch`], so a
/// later top-level run can never change what an in-flight re-run sees.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: u64,
    options: RunOptions,
    trigger: Trigger,
}

impl RunContext {
    pub fn new(run_id: u64, options: RunOptions) -> Self {
        Self {
            run_id,
            options,
            trigger: Trigger::InitialPass,
        }
    }

    /// Derive the context for a single watch-triggered re-run.
    pub fn for_file_watch(&self, path: &Path) -> Self {
        Self {
            run_id: self.run_id,
            options: self.options.clone(),
            trigger: Trigger::FileWatch {
                path: path.to_path_buf(),
            },
        }
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn is_watch_rerun(&self) -> bool {
        matches!(self.trigger, Trigger::FileWatch { .. })
    }
}
