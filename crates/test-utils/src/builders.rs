#![allow(dead_code)]

use taskroute::config::{ConfigFile, RawConfigFile, RuleConfig};
use taskroute::types::FilesSpec;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_rule(mut self, pattern: &str, cmd: &str) -> Self {
        self.config.rule.push(RuleConfig {
            pattern: pattern.to_string(),
            cmd: cmd.to_string(),
        });
        self
    }

    pub fn with_files(mut self, globs: &[&str]) -> Self {
        self.config.files = Some(FilesSpec::Many(
            globs.iter().map(|g| g.to_string()).collect(),
        ));
        self
    }

    pub fn with_watch(mut self, val: bool) -> Self {
        self.config.options.watch = val;
        self
    }

    pub fn with_commit(mut self, val: bool) -> Self {
        self.config.options.commit = val;
        self
    }

    pub fn with_before(mut self, cmd: &str) -> Self {
        self.config.hooks.before = Some(cmd.to_string());
        self
    }

    pub fn with_after(mut self, cmd: &str) -> Self {
        self.config.hooks.after = Some(cmd.to_string());
        self
    }

    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.config.watch.poll_interval_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
