// src/rules/map.rs

use std::fmt;
use std::sync::Arc;

use crate::engine::Action;

/// Declaration-ordered mapping from pattern string to action.
///
/// Keys are unique. Inserting a pattern that is already present replaces
/// its action in place: the entry keeps the position of its first
/// declaration and the later action wins. Two textually identical patterns
/// therefore compile to a single rule.
#[derive(Clone, Default)]
pub struct RuleMap {
    entries: Vec<(String, Arc<dyn Action>)>,
}

impl fmt::Debug for RuleMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(p, _)| p))
            .finish()
    }
}

impl RuleMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the action for `pattern`.
    ///
    /// Returns the replaced action, if any.
    pub fn insert(
        &mut self,
        pattern: impl Into<String>,
        action: impl Action + 'static,
    ) -> Option<Arc<dyn Action>> {
        self.insert_shared(pattern, Arc::new(action))
    }

    pub fn insert_shared(
        &mut self,
        pattern: impl Into<String>,
        action: Arc<dyn Action>,
    ) -> Option<Arc<dyn Action>> {
        let pattern = pattern.into();
        match self.entries.iter_mut().find(|(p, _)| *p == pattern) {
            Some((_, existing)) => Some(std::mem::replace(existing, action)),
            None => {
                self.entries.push((pattern, action));
                None
            }
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, pattern: impl Into<String>, action: impl Action + 'static) -> Self {
        self.insert(pattern, action);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Action>)> {
        self.entries.iter().map(|(p, a)| (p.as_str(), a))
    }
}
