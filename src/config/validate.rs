// src/config/validate.rs

use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{Result, TaskrouteError};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::TaskrouteError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_rules(cfg)?;
    cfg.options.validate()?;
    validate_watch_section(cfg)?;
    validate_rules(cfg)?;
    validate_hooks(cfg)?;
    Ok(())
}

fn ensure_has_rules(cfg: &RawConfigFile) -> Result<()> {
    if cfg.rule.is_empty() {
        return Err(TaskrouteError::ConfigError(
            "config must contain at least one [[rule]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch_section(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.poll_interval_ms == 0 {
        return Err(TaskrouteError::ConfigError(
            "[watch].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_rules(cfg: &RawConfigFile) -> Result<()> {
    for (idx, rule) in cfg.rule.iter().enumerate() {
        if rule.cmd.trim().is_empty() {
            return Err(TaskrouteError::ConfigError(format!(
                "rule #{} ('{}') has an empty `cmd`",
                idx + 1,
                rule.pattern
            )));
        }
        // Surface syntax errors at load time, with the offending pattern.
        Regex::new(&rule.pattern).map_err(|source| TaskrouteError::Pattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
    }
    Ok(())
}

fn validate_hooks(cfg: &RawConfigFile) -> Result<()> {
    let hooks = [("before", &cfg.hooks.before), ("after", &cfg.hooks.after)];
    for (name, cmd) in hooks {
        if cmd.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(TaskrouteError::ConfigError(format!(
                "[hooks].{name} must not be empty; remove it instead"
            )));
        }
    }
    Ok(())
}
