// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::default_config_path;

/// Command-line arguments for `taskroute`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "taskroute",
    version,
    about = "Route files to commands by regular expression, optionally re-running on change.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Taskroute.toml` in the current working directory.
    #[arg(long, value_name = "PATH", default_value_os_t = default_config_path())]
    pub config: PathBuf,

    /// Keep running and re-run a file's command when the file changes.
    ///
    /// Overrides `[options].watch` when set.
    #[arg(long)]
    pub watch: bool,

    /// Read file content from the last commit instead of the working tree.
    ///
    /// Cannot be combined with `--watch`.
    #[arg(long)]
    pub commit: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TASKROUTE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print which rule each file routes to, but don't
    /// execute any commands.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
