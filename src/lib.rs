// src/lib.rs

pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{default_config_path, load_from_path, ConfigFile, RawConfigFile};
use crate::engine::{Runner, WatchConfig};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading + command-line overrides
/// - the polling runner
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let watch = WatchConfig::try_from(&cfg)?;
    let mut runner = Runner::new(watch)?;

    // Ctrl-C stops the observation early; otherwise the runtime budget does.
    let interrupted = tokio::select! {
        res = runner.run() => {
            res?;
            false
        }
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                eprintln!("failed to listen for Ctrl+C: {e}");
            }
            info!("interrupted; stopping observation");
            true
        }
    };

    if interrupted {
        runner.terminate_background();
    } else {
        runner.join_background().await;
    }

    Ok(())
}

/// Load the config file (explicit `--config`, or the default file if it
/// exists), then apply command-line overrides and validate.
fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => {
            let default_path = default_config_path();
            if default_path.is_file() {
                debug!(path = ?default_path, "using default config file");
                load_from_path(&default_path)?
            } else {
                RawConfigFile::default()
            }
        }
    };

    args.apply_to(&mut raw);
    Ok(ConfigFile::try_from(raw)?)
}

/// Simple dry-run output: print the effective configuration.
fn print_dry_run(cfg: &ConfigFile) {
    println!("change-detector dry-run");
    println!("  watch.dir = {}", cfg.target_dir().display());
    println!("  watch.recursive = {}", cfg.watch.recursive);
    println!("  watch.interval = {:?}", cfg.interval());
    println!("  watch.runtime = {:?}", cfg.runtime());
    if !cfg.watch.exclude.is_empty() {
        println!("  watch.exclude = {:?}", cfg.watch.exclude);
    }
    if !cfg.watch.exclude_paths.is_empty() {
        println!("  watch.exclude_paths = {:?}", cfg.watch.exclude_paths);
    }
    println!("  watch.exclude_self = {}", cfg.watch.exclude_self);
    println!("  watch.evict_missing = {}", cfg.watch.evict_missing);
    println!();

    let action = &cfg.action;
    println!("action:");
    if let Some(ref cmd) = action.once {
        println!("  once: {cmd}");
    }
    if let Some(ref cmd) = action.parallel {
        println!("  parallel: {cmd}");
    }
    if let Some(ref cmd) = action.foreach {
        println!("  foreach: {cmd}");
    }
    if action.configured().is_empty() {
        println!("  (none; changes are only logged)");
    }
    println!("  on_conflict: {:?}", action.on_conflict);
    println!("  on_failure: {:?}", action.on_failure);

    debug!("dry-run complete (no watching)");
}
