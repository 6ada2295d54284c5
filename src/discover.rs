// src/discover.rs

//! Resolve the `files` field of the config into an ordered file list.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::errors::{Result, TaskrouteError};
use crate::fs::FileSystem;
use crate::path_utils::relative_str;
use crate::types::FilesSpec;

/// Directory names never descended into.
const SKIPPED_DIRS: &[&str] = &[".git"];

/// Collect files under `root` selected by `files_spec` (all files when `None`).
///
/// Returned paths are relative to `root` and sorted, which fixes the
/// discovery order the dispatch pass and its completion fold follow.
pub fn resolve_files(
    fs: &dyn FileSystem,
    root: &Path,
    files_spec: Option<&FilesSpec>,
) -> Result<Vec<PathBuf>> {
    let globs = files_spec.map(|s| build_globset(&s.patterns())).transpose()?;

    let mut files = Vec::new();
    let mut stack = vec![root.to_path_buf()];

    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                let skipped = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| SKIPPED_DIRS.contains(&n));
                if !skipped {
                    stack.push(path);
                }
            } else if fs.is_file(&path) {
                let Some(rel) = relative_str(root, &path) else {
                    continue;
                };
                if globs.as_ref().is_none_or(|g| g.is_match(&rel)) {
                    files.push(PathBuf::from(rel));
                }
            }
        }
    }

    files.sort();
    debug!(count = files.len(), ?root, "resolved files");
    Ok(files)
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[&str]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).map_err(|source| TaskrouteError::Glob {
            pattern: pat.to_string(),
            source,
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| TaskrouteError::Glob {
        pattern: patterns.join(", "),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn tree() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("./src/b.src", "b");
        fs.add_file("./src/a.src", "a");
        fs.add_file("./README.md", "# readme");
        fs.add_file("./.git/HEAD", "ref: refs/heads/main");
        fs
    }

    #[test]
    fn absent_spec_means_every_file_sorted() {
        let files = resolve_files(&tree(), Path::new("."), None).unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("README.md"),
                PathBuf::from("src/a.src"),
                PathBuf::from("src/b.src"),
            ]
        );
    }

    #[test]
    fn single_glob_and_list() {
        let fs = tree();
        let one = FilesSpec::One("src/**".to_string());
        assert_eq!(resolve_files(&fs, Path::new("."), Some(&one)).unwrap().len(), 2);

        let many = FilesSpec::Many(vec!["*.md".to_string(), "src/a.*".to_string()]);
        assert_eq!(
            resolve_files(&fs, Path::new("."), Some(&many)).unwrap(),
            vec![PathBuf::from("README.md"), PathBuf::from("src/a.src")]
        );
    }

    #[test]
    fn bad_glob_is_reported() {
        let selection = FilesSpec::One("src/[".to_string());
        assert!(matches!(
            resolve_files(&tree(), Path::new("."), Some(&selection)),
            Err(TaskrouteError::Glob { .. })
        ));
    }
}
