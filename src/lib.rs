// src/lib.rs

pub mod cli;
pub mod config;
pub mod discover;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod path_utils;
pub mod rules;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::cli::CliArgs;
use crate::config::{build_hooks, build_rule_map, load_and_validate, ConfigFile};
use crate::discover::resolve_files;
use crate::engine::{Orchestrator, PendingSet};
use crate::fs::RealFileSystem;
use crate::types::RunOptions;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and CLI overrides
/// - file discovery
/// - rule compilation and hooks
/// - one orchestrated run
/// - in watch mode, waiting for Ctrl-C while the pollers re-run commands
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = args.config.clone();
    let cfg = load_and_validate(&config_path)?;
    let options = effective_options(&cfg, &args);
    options.validate()?;

    let root = config_root_dir(&config_path);
    let files = resolve_files(&RealFileSystem, &root, cfg.files())?;
    let mut pending: PendingSet = files.into_iter().collect();

    let orchestrator = Orchestrator::new(&build_rule_map(&cfg, &root), options)?
        .with_hooks(build_hooks(&cfg, &root))
        .with_root(&root)
        .with_filesystem(Arc::new(RealFileSystem))
        .with_poll_interval(Duration::from_millis(cfg.watch_section().poll_interval_ms));

    if args.dry_run {
        print_dry_run(&orchestrator, &pending);
        return Ok(());
    }

    let report = orchestrator.run(&mut pending).await?;

    for path in pending.remaining() {
        debug!(path = %path.display(), "no rule matched");
    }

    let Some(supervisor) = report.supervisor else {
        return match report.failure {
            Some(err) => Err(err.into()),
            None => Ok(()),
        };
    };

    if let Some(err) = &report.failure {
        warn!(error = %err, "initial pass failed; still watching");
    }
    info!(
        files = supervisor.len(),
        interval = ?supervisor.poll_interval(),
        "watching for changes (Ctrl-C to stop)"
    );
    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    drop(supervisor);
    Ok(())
}

/// Config options with CLI flags OR-ed in.
fn effective_options(cfg: &ConfigFile, args: &CliArgs) -> RunOptions {
    let mut options = cfg.options().clone();
    options.watch |= args.watch;
    options.commit |= args.commit;
    options
}

/// Figure out the directory files are discovered in and commands run from.
///
/// - If the config path has a non-empty parent (e.g. "ci/Taskroute.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Taskroute.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Dry-run output: which rule each file would be routed to.
fn print_dry_run(orchestrator: &Orchestrator, pending: &PendingSet) {
    let options = orchestrator.options();
    println!("taskroute dry-run");
    println!("  root = {}", orchestrator.root().display());
    println!("  watch = {}, commit = {}", options.watch, options.commit);
    println!();

    println!("rules ({}):", orchestrator.rules().len());
    for (idx, rule) in orchestrator.rules().iter().enumerate() {
        println!("  #{idx} {}", rule.pattern());
    }
    println!();

    let routes = orchestrator.plan(pending);
    println!("routes ({} of {} files):", routes.len(), pending.remaining_count());
    for route in &routes {
        println!("  {} -> #{} {}", route.path.display(), route.rule_index, route.pattern);
    }

    debug!("dry-run complete (no execution)");
}
