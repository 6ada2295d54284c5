// src/errors.rs

//! Crate-wide error type and aliases.

use std::fmt;

use thiserror::Error;

/// Which lifecycle hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    Before,
    After,
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookKind::Before => f.write_str("before"),
            HookKind::After => f.write_str("after"),
        }
    }
}

#[derive(Error, Debug)]
pub enum TaskrouteError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("watch mode cannot be combined with commit mode: there is no file on disk to poll")]
    WatchWithCommit,

    #[error("invalid rule pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid glob '{pattern}': {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("{hook} hook failed: {message}")]
    HookFailed { hook: HookKind, message: String },

    #[error("action for '{path}' failed: {message}")]
    ActionFailed { path: String, message: String },

    #[error("action for '{path}' panicked or was aborted")]
    ActionPanicked { path: String },

    #[error("a run is already in progress on this orchestrator")]
    RunInProgress,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, TaskrouteError>;
