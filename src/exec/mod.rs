// src/exec/mod.rs

//! Process execution layer.
//!
//! The engine treats actions and hooks as opaque callables; this module
//! provides the shell-command implementations the CLI builds from the
//! config file, using `tokio::process::Command`.

pub mod command;

pub use command::{context_env, CommandAction, CommandHook};
