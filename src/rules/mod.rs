// src/rules/mod.rs

//! Pattern rules: the ordered `pattern -> action` map, its compiled form
//! and the match value handed to actions.
//!
//! - [`map`] holds the declaration-ordered, key-unique [`RuleMap`].
//! - [`compiler`] turns a map into an ordered `Vec<Rule>`.

pub mod compiler;
pub mod map;

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

use crate::engine::{Action, RunContext, TaskOutput};
use crate::path_utils::match_subject;

pub use compiler::compile_rules;
pub use map::RuleMap;

/// A compiled `(pattern, action)` pair.
///
/// Cloning is cheap: the action is shared.
#[derive(Clone)]
pub struct Rule {
    pattern: Regex,
    action: Arc<dyn Action>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

impl Rule {
    pub(crate) fn new(pattern: Regex, action: Arc<dyn Action>) -> Self {
        Self { pattern, action }
    }

    /// Source text of the pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Match `path` against this rule's pattern (unanchored search).
    pub fn match_path(&self, path: &Path) -> Option<RuleMatch> {
        let subject = match_subject(path);
        let caps = self.pattern.captures(&subject)?;
        let whole = caps.get(0)?;
        let range = whole.range();
        let groups = caps
            .iter()
            .map(|m| m.map(|m| m.as_str().to_string()))
            .collect();
        Some(RuleMatch {
            path: path.to_path_buf(),
            subject,
            groups,
            range,
        })
    }

    /// Call the action for a match.
    pub fn invoke(&self, ctx: &RunContext, rule_match: &RuleMatch) -> TaskOutput {
        self.action.invoke(ctx, rule_match)
    }
}

/// Owned result of matching a rule against a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    path: PathBuf,
    subject: String,
    groups: Vec<Option<String>>,
    range: Range<usize>,
}

impl RuleMatch {
    /// The file this match belongs to, as it appeared in the pending set.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The normalised string the pattern ran against.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The text of the whole match.
    pub fn as_str(&self) -> &str {
        &self.subject[self.range.clone()]
    }

    /// Byte range of the whole match within [`subject`](Self::subject).
    pub fn range(&self) -> Range<usize> {
        self.range.clone()
    }

    /// Capture group `i`; `0` is the whole match.
    pub fn get(&self, i: usize) -> Option<&str> {
        self.groups.get(i).and_then(|g| g.as_deref())
    }

    /// Number of groups including the whole match.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn groups(&self) -> &[Option<String>] {
        &self.groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::action_fn;

    fn rule(pattern: &str) -> Rule {
        Rule::new(
            Regex::new(pattern).unwrap(),
            Arc::new(action_fn(|_, _| TaskOutput::done())),
        )
    }

    #[test]
    fn match_is_unanchored_and_keeps_groups() {
        let r = rule(r"(\w+)\.src$");
        let m = r.match_path(Path::new("./lib/core.src")).unwrap();
        assert_eq!(m.subject(), "lib/core.src");
        assert_eq!(m.as_str(), "core.src");
        assert_eq!(m.get(1), Some("core"));
        assert_eq!(m.len(), 2);
        assert_eq!(m.path(), Path::new("./lib/core.src"));
    }

    #[test]
    fn optional_group_that_did_not_participate_is_none() {
        let r = rule(r"^(docs/)?(\w+)\.md$");
        let m = r.match_path(Path::new("b.md")).unwrap();
        assert_eq!(m.get(1), None);
        assert_eq!(m.get(2), Some("b"));
    }

    #[test]
    fn no_match_returns_none() {
        assert!(rule(r"\.md$").match_path(Path::new("c.txt")).is_none());
    }
}
