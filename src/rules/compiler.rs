// src/rules/compiler.rs

use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::errors::{Result, TaskrouteError};
use crate::rules::{Rule, RuleMap};

/// Compile a [`RuleMap`] into rules, preserving its order.
///
/// Patterns are compiled as-is, with no implicit anchoring. The first
/// malformed pattern aborts compilation.
pub fn compile_rules(map: &RuleMap) -> Result<Vec<Rule>> {
    let mut rules = Vec::with_capacity(map.len());

    for (pattern, action) in map.iter() {
        let regex = Regex::new(pattern).map_err(|source| TaskrouteError::Pattern {
            pattern: pattern.to_string(),
            source,
        })?;
        rules.push(Rule::new(regex, Arc::clone(action)));
    }

    debug!(count = rules.len(), "compiled rules");
    Ok(rules)
}
