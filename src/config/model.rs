// src/config/model.rs

use serde::Deserialize;

use crate::types::{FilesSpec, RunOptions};

/// Configuration exactly as read from a TOML file, before validation.
///
/// ```toml
/// files = ["src/**", "docs/*.md"]   # must precede the first table
///
/// [options]
/// watch = true
///
/// [watch]
/// poll_interval_ms = 250
///
/// [hooks]
/// before = "mkdir -p dist"
/// after = "echo done"
///
/// [[rule]]
/// pattern = "\\.src$"
/// cmd = "compile \"$TASKROUTE_PATH\""
/// ```
///
/// `[[rule]]` entries are kept in file order; that order is rule priority.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// One glob or a list; absent means every file under the root.
    #[serde(default)]
    pub files: Option<FilesSpec>,

    #[serde(default)]
    pub options: RunOptions,

    #[serde(default)]
    pub watch: WatchSection,

    #[serde(default)]
    pub hooks: HooksSection,

    #[serde(default)]
    pub rule: Vec<RuleConfig>,
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    250
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

/// `[hooks]` section: shell commands run around each pass.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HooksSection {
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

/// One `[[rule]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleConfig {
    /// Regular expression searched for in each file's relative path.
    pub pattern: String,
    /// Shell command to run for every file routed to this rule.
    pub cmd: String,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    files: Option<FilesSpec>,
    options: RunOptions,
    watch: WatchSection,
    hooks: HooksSection,
    rules: Vec<RuleConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            files: raw.files,
            options: raw.options,
            watch: raw.watch,
            hooks: raw.hooks,
            rules: raw.rule,
        }
    }

    pub fn files(&self) -> Option<&FilesSpec> {
        self.files.as_ref()
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn watch_section(&self) -> &WatchSection {
        &self.watch
    }

    pub fn hooks(&self) -> &HooksSection {
        &self.hooks
    }

    /// Rules in file order. Entries sharing a pattern are still listed
    /// separately here; they collapse when the rule map is built.
    pub fn rules(&self) -> &[RuleConfig] {
        &self.rules
    }
}
