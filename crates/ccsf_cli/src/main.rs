//! ccsf CLI
//!
//! Headless front-end for the season engine: apply generator output to the
//! local save, inspect standings and the calendar, and move saves in and
//! out of bundles.

use anyhow::{bail, Context, Result};
use ccsf_core::save::validate_state;
use ccsf_core::{
    BatchReport, BootSource, Engine, EngineConfig, GameState, PatchBatch, Repair, SaveStore,
    Standings,
};
use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ccsf")]
#[command(about = "F1 ZX season engine: patches, standings and saves", long_about = None)]
struct Cli {
    /// Directory holding the local save (state.json)
    #[arg(long, global = true, default_value = "saves")]
    save_dir: PathBuf,

    /// Engine config file (YAML or JSON); falls back to CCSF_ENGINE_CONFIG
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply a patch batch file ("-" for stdin)
    Apply { batch: PathBuf },

    /// Apply a raw generator reply ("-" for stdin)
    Reply { text: PathBuf },

    /// Show driver and constructor standings
    Standings,

    /// Show the next calendar round
    NextRace,

    /// Run the sanity checker and the integrity check
    Check,

    /// Write the save as a player bundle
    Export {
        /// Output directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },

    /// Replace the local save with a bundle
    Import { bundle: PathBuf },

    /// Boot a game: local save, then bundle, then seed directory
    Seed {
        /// Modular seed directory with manifest.json
        #[arg(long, default_value = "seed")]
        seed_dir: PathBuf,

        /// Player bundle tried before the seed
        #[arg(long)]
        bundle: Option<PathBuf>,
    },

    /// Print the JSON schema of a patch batch
    Schema,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let engine = Engine::new(load_config(cli.config.as_deref())?);
    let store = SaveStore::new(&cli.save_dir);

    match &cli.command {
        Commands::Apply { batch } => {
            let mut state = load_state(&engine, &store)?;
            let batch: Value =
                serde_json::from_str(&read_input(batch)?).context("patch batch is not JSON")?;
            let report = engine.apply_batch(&mut state, &batch);
            if report.is_ok() {
                store.save_local(&state)?;
            }
            print_report(&cli, &report, &state);
        }

        Commands::Reply { text } => {
            let mut state = load_state(&engine, &store)?;
            let outcome = engine.handle_reply(&mut state, &read_input(text)?);
            if outcome.state_changed() {
                store.save_local(&state)?;
            }
            match (&outcome.report, cli.json) {
                (Some(report), true) => print_report(&cli, report, &state),
                (None, true) => println!("{}", json!({ "ok": false, "message": outcome.message })),
                (_, false) => println!("{}", outcome.message),
            }
        }

        Commands::Standings => {
            let state = load_state(&engine, &store)?;
            let standings = engine.standings(&state);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&standings)?);
            } else {
                print_standings(&standings);
            }
        }

        Commands::NextRace => {
            let state = load_state(&engine, &store)?;
            let next = engine.next_race(&state);
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&next)?);
            } else {
                match next {
                    Some(next) if next.wrapped => println!(
                        "Season complete. Calendar restarts with round {}: {}",
                        next.entry.round, next.entry.name
                    ),
                    Some(next) => println!("Round {}: {}", next.entry.round, next.entry.name),
                    None => println!("Calendar is empty"),
                }
            }
        }

        Commands::Check => {
            let state = load_state(&engine, &store)?;
            let issues = validate_state(&state);
            if cli.json {
                let issues: Vec<String> = issues.iter().map(ToString::to_string).collect();
                println!("{}", json!({ "ok": issues.is_empty(), "issues": issues }));
            } else if issues.is_empty() {
                println!("Save is consistent");
            } else {
                for issue in &issues {
                    println!("  - {issue}");
                }
            }
            if !issues.is_empty() {
                bail!("{} integrity issue(s)", issues.len());
            }
        }

        Commands::Export { out } => {
            let state = load_state(&engine, &store)?;
            let path = SaveStore::export_bundle(&state, out)?;
            print_line(&cli, json!({ "bundle": path.display().to_string() }), || {
                format!("Exported {}", path.display())
            });
        }

        Commands::Import { bundle } => {
            let mut state = SaveStore::import_bundle(bundle)
                .with_context(|| format!("failed to import {}", bundle.display()))?;
            log_repairs(&engine.resume(&mut state));
            store.save_local(&state)?;
            print_line(&cli, json!({ "imported": bundle.display().to_string() }), || {
                format!("Imported {} into {}", bundle.display(), store.local_path().display())
            });
        }

        Commands::Seed { seed_dir, bundle } => {
            let mut booted = store
                .boot(bundle.as_deref(), seed_dir)
                .with_context(|| format!("failed to boot from {}", seed_dir.display()))?;
            let repairs = engine.resume(&mut booted.state);
            log_repairs(&repairs);
            if !repairs.is_empty() || !matches!(booted.source, BootSource::Local) {
                store.save_local(&booted.state)?;
            }
            let source = match &booted.source {
                BootSource::Local => "local save".to_string(),
                BootSource::Bundle(path) => format!("bundle {}", path.display()),
                BootSource::Seed(report) => {
                    format!("seed ({} rumour(s) nudged)", report.nudged_rumours.len())
                }
            };
            print_line(&cli, json!({ "source": source }), || format!("Booted from {source}"));
        }

        Commands::Schema => {
            let schema = schemars::schema_for!(PatchBatch);
            println!("{}", serde_json::to_string_pretty(&schema)?);
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) -> Result<()> {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default))?;
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            Ok(EngineConfig::from_yaml(&content)?)
        }
        None => Ok(EngineConfig::from_env_or_default()?),
    }
}

/// Load the local save and run the sanity checker, persisting any repair.
fn load_state(engine: &Engine, store: &SaveStore) -> Result<GameState> {
    let Some(mut state) = store.load_local()? else {
        bail!("no save in {}; run `ccsf seed` first", store.dir().display());
    };
    let repairs = engine.resume(&mut state);
    if !repairs.is_empty() {
        log_repairs(&repairs);
        store.save_local(&state)?;
    }
    Ok(state)
}

fn log_repairs(repairs: &[Repair]) {
    for repair in repairs {
        warn!("repaired: {repair}");
    }
}

fn read_input(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn print_line(cli: &Cli, value: Value, text: impl FnOnce() -> String) {
    if cli.json {
        println!("{value}");
    } else {
        println!("{}", text());
    }
}

fn print_report(cli: &Cli, report: &BatchReport, state: &GameState) {
    let meta = state.meta();
    if cli.json {
        let skipped: Vec<Value> = report
            .outcome
            .skipped
            .iter()
            .map(|s| json!({ "index": s.index, "path": s.path, "reason": s.reason.as_str() }))
            .collect();
        println!(
            "{}",
            json!({
                "ok": report.is_ok(),
                "reason": report.reason(),
                "changed": report.outcome.changed,
                "skipped": skipped,
                "restored_round": report.restored_round,
                "last_completed_round": meta.last_completed_round,
                "timeline": meta.timeline.map(|t| t.as_str()),
            })
        );
        return;
    }

    match report.reason() {
        None => {
            println!("Database updated: {}", report.outcome.changed.join(", "));
            if let Some(progress) = report.progress.filter(|p| p.advanced()) {
                info!(
                    "round {} -> {} ({})",
                    progress.previous_round,
                    progress.current_round,
                    meta.timeline.map_or("unknown", |t| t.as_str())
                );
            }
        }
        Some(reason) => println!("No changes applied: {reason}"),
    }
    for skipped in &report.outcome.skipped {
        println!(
            "  skipped #{} {}: {}",
            skipped.index,
            skipped.path.as_deref().unwrap_or("?"),
            skipped.reason.as_str()
        );
    }
}

fn print_standings(standings: &Standings) {
    println!("Drivers");
    for (i, row) in standings.drivers.iter().enumerate() {
        println!(
            "{:>3}. {:<24} {:<20} {:>6} pts  {} W  {} P",
            i + 1,
            row.driver,
            row.team,
            row.points,
            row.wins,
            row.podiums
        );
    }
    println!();
    println!("Constructors");
    for (i, row) in standings.teams.iter().enumerate() {
        println!(
            "{:>3}. {:<24} {:>6} pts  {} W  {} P",
            i + 1,
            row.team,
            row.points,
            row.wins,
            row.podiums
        );
    }
}
