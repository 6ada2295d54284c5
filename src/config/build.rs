// src/config/build.rs

use std::path::Path;

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::engine::Hooks;
use crate::errors::HookKind;
use crate::exec::{CommandAction, CommandHook};
use crate::rules::RuleMap;

/// Build the rule map for `cfg`, with commands running in `workdir`.
///
/// Later `[[rule]]` entries with an already-seen pattern replace the
/// earlier command but keep the earlier position.
pub fn build_rule_map(cfg: &ConfigFile, workdir: &Path) -> RuleMap {
    let mut map = RuleMap::new();
    for rule in cfg.rules() {
        let replaced = map.insert(rule.pattern.clone(), CommandAction::new(&rule.cmd, workdir));
        if replaced.is_some() {
            debug!(pattern = %rule.pattern, "duplicate rule pattern; later command wins");
        }
    }
    map
}

pub fn build_hooks(cfg: &ConfigFile, workdir: &Path) -> Hooks {
    let section = cfg.hooks();
    let mut hooks = Hooks::new();
    if let Some(cmd) = &section.before {
        hooks = hooks.with_before(CommandHook::new(HookKind::Before, cmd, workdir));
    }
    if let Some(cmd) = &section.after {
        hooks = hooks.with_after(CommandHook::new(HookKind::After, cmd, workdir));
    }
    hooks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_str;

    fn load(text: &str) -> ConfigFile {
        ConfigFile::try_from(parse_str(text).unwrap()).unwrap()
    }

    #[test]
    fn duplicate_patterns_collapse_to_first_position() {
        let cfg = load(
            r#"
[[rule]]
pattern = "a"
cmd = "one"

[[rule]]
pattern = "b"
cmd = "two"

[[rule]]
pattern = "a"
cmd = "three"
"#,
        );
        let map = build_rule_map(&cfg, Path::new("."));
        assert_eq!(map.patterns().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn hooks_follow_the_hooks_section() {
        let cfg = load(
            r#"
[hooks]
after = "echo done"

[[rule]]
pattern = "x"
cmd = "true"
"#,
        );
        let hooks = build_hooks(&cfg, Path::new("."));
        assert!(!hooks.has_before());
        assert!(hooks.has_after());
    }
}
