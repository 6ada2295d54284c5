// src/watch/repo_state.rs

//! Version-control state probing for the watch guards.

use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::fs::FileSystem;

/// Externally observable repository state the watch pollers consult.
pub trait RepoState: Send + Sync + Debug {
    /// True while a rebase is in progress. Checkout churn during a rebase
    /// must not be mistaken for edits.
    fn is_rebasing(&self) -> bool;
}

/// Used when the root is not inside a repository.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRepository;

impl RepoState for NoRepository {
    fn is_rebasing(&self) -> bool {
        false
    }
}

/// Git repository state, read from the git directory on every probe.
///
/// A rebase is in progress while `rebase-merge/` (interactive and merge
/// backends) or `rebase-apply/` (apply backend) exists in the git dir.
#[derive(Debug, Clone)]
pub struct GitRepoState {
    fs: Arc<dyn FileSystem>,
    git_dir: Option<PathBuf>,
}

impl GitRepoState {
    /// Locate the git dir by walking up from `start`.
    pub fn discover(fs: Arc<dyn FileSystem>, start: &Path) -> Self {
        let start = fs
            .canonicalize(start)
            .unwrap_or_else(|_| start.to_path_buf());
        let git_dir = find_git_dir(fs.as_ref(), &start);
        debug!(?git_dir, "git repository discovery");
        Self { fs, git_dir }
    }

    /// Use a known git dir.
    pub fn at(fs: Arc<dyn FileSystem>, git_dir: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            git_dir: Some(git_dir.into()),
        }
    }

    pub fn git_dir(&self) -> Option<&Path> {
        self.git_dir.as_deref()
    }
}

impl RepoState for GitRepoState {
    fn is_rebasing(&self) -> bool {
        let Some(git_dir) = &self.git_dir else {
            return false;
        };
        self.fs.exists(&git_dir.join("rebase-merge")) || self.fs.exists(&git_dir.join("rebase-apply"))
    }
}

fn find_git_dir(fs: &dyn FileSystem, start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);

    while let Some(current) = dir {
        if current.as_os_str().is_empty() {
            break;
        }

        let candidate = current.join(".git");
        if fs.is_dir(&candidate) {
            return Some(candidate);
        }
        if fs.is_file(&candidate) {
            // Worktrees and submodules: `.git` is a file holding `gitdir: <path>`.
            if let Some(target) = read_gitdir_file(fs, &candidate) {
                let resolved = if target.is_absolute() {
                    target
                } else {
                    current.join(target)
                };
                return Some(resolved);
            }
        }

        dir = current.parent();
    }

    None
}

fn read_gitdir_file(fs: &dyn FileSystem, path: &Path) -> Option<PathBuf> {
    let contents = fs.read_to_string(path).ok()?;
    contents
        .lines()
        .find_map(|line| line.strip_prefix("gitdir:"))
        .map(|rest| PathBuf::from(rest.trim()))
}
