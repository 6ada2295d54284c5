// src/path_utils.rs

//! Path normalisation shared by discovery and rule matching.

use std::path::Path;

/// The string a rule pattern is matched against: the path with forward
/// slashes and any leading `./` removed.
///
/// Rules are written against paths like `src/lib.rs` regardless of
/// platform or of how the caller spelled the path.
pub fn match_subject(path: &Path) -> String {
    let s = path.to_string_lossy().replace('\\', "/");
    let mut rest = s.as_str();
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest.to_string()
}

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Returns `None` if the path does not live under `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(match_subject)
}
