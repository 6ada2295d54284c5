// src/config/mod.rs

//! Configuration loading and validation for taskroute.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate it into a `ConfigFile` (`validate.rs`).
//! - Turn it into the engine's rule map and hooks (`build.rs`).

pub mod build;
pub mod loader;
pub mod model;
pub mod validate;

pub use build::{build_hooks, build_rule_map};
pub use loader::{default_config_path, load_and_validate, load_from_path, parse_str};
pub use model::{ConfigFile, HooksSection, RawConfigFile, RuleConfig, WatchSection};
