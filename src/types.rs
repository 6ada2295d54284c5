use serde::Deserialize;

use crate::errors::{Result, TaskrouteError};

/// Options for a single top-level run.
///
/// Only `watch` and `commit` influence the orchestrator. `fields` and
/// `compare_fields` are carried through for the file statistics report,
/// which lives outside this crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Keep running and re-dispatch actions when matched files change.
    pub watch: bool,
    /// Source file content from the version-control object store instead
    /// of the working tree.
    pub commit: bool,
    pub fields: Vec<String>,
    pub compare_fields: Vec<String>,
}

impl RunOptions {
    /// Whether the watch supervisor should be started for this run.
    pub fn watch_enabled(&self) -> bool {
        self.watch && !self.commit
    }

    /// Reject option combinations that cannot be honoured.
    ///
    /// Watch mode polls files on disk; commit mode reads them from the
    /// object store, so there is nothing to poll.
    pub fn validate(&self) -> Result<()> {
        if self.watch && self.commit {
            return Err(TaskrouteError::WatchWithCommit);
        }
        Ok(())
    }
}

/// The `files` field of the config: one glob or a list of globs.
///
/// An absent field means "every file under the root".
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FilesSpec {
    One(String),
    Many(Vec<String>),
}

impl FilesSpec {
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            FilesSpec::One(p) => vec![p.as_str()],
            FilesSpec::Many(list) => list.iter().map(String::as_str).collect(),
        }
    }
}
