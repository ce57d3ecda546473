#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line host for the Hypercube difficulty and encounter engine.

mod config;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hypercube_core::format;
use hypercube_system_difficulty::DifficultyResolver;
use hypercube_system_level::{level_index, LevelController};
use hypercube_system_run_history::{JsonFileStore, RunHistoryStore, Scoreboard, DEFAULT_SLOT};

use crate::config::HostConfig;

#[derive(Debug, Parser)]
#[command(
    name = "hypercube",
    about = "Plays headless Hypercube attempts against adaptive difficulty"
)]
struct Cli {
    /// TOML file overriding the default tunables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory holding the run history slot.
    #[arg(long, global = true, default_value = "saves")]
    save_dir: PathBuf,
    /// Name of the run history slot.
    #[arg(long, global = true, default_value = DEFAULT_SLOT)]
    slot: String,
    #[command(subcommand)]
    mode: Mode,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Plays scripted attempts, re-resolving the difficulty before each one.
    Simulate {
        /// Number of attempts to play.
        #[arg(long, default_value_t = 3)]
        runs: usize,
        /// Seed for spawn layout and shuffling.
        #[arg(long, default_value_t = 7)]
        seed: u64,
        /// Map to start on; the first configured level when omitted.
        #[arg(long)]
        map: Option<String>,
    },
    /// Prints the best recorded runs.
    Scoreboard {
        /// Rows to print.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
    /// Describes the difficulty the next attempt will use.
    Brief,
    /// Deletes the run history slot.
    Clear,
}

/// Entry point for the Hypercube command-line interface.
fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = HostConfig::load(cli.config.as_deref())?;
    let mut store = JsonFileStore::new(&cli.save_dir, &cli.slot);

    match cli.mode {
        Mode::Simulate { runs, seed, map } => simulate(&config, &mut store, runs, seed, map),
        Mode::Scoreboard { top } => {
            let history = store.load().context("failed to read run history")?;
            let board = Scoreboard::from_history(
                history.as_deref().unwrap_or_default(),
                config.level.level_titles.clone(),
            );
            if board.is_empty() {
                println!("No scoring runs recorded yet.");
            } else {
                print!("{}", board.table(top));
            }
            Ok(())
        }
        Mode::Brief => {
            let history = LevelController::load_history(&store);
            let resolver = DifficultyResolver::new(config.difficulty);
            println!("{}", resolver.brief(resolver.parameter(&history)));
            Ok(())
        }
        Mode::Clear => {
            store
                .clear()
                .with_context(|| format!("failed to clear {}", store.path().display()))?;
            println!("Cleared {}", store.path().display());
            Ok(())
        }
    }
}

fn simulate(
    config: &HostConfig,
    store: &mut JsonFileStore,
    runs: usize,
    seed: u64,
    map: Option<String>,
) -> Result<()> {
    let mut map = match map {
        Some(map) => map,
        None => config
            .level
            .level_names
            .first()
            .cloned()
            .context("no levels configured")?,
    };

    for attempt in 0..runs {
        let attempt_seed = seed.wrapping_add(attempt as u64);
        let summary = simulation::run_attempt(config, &map, attempt_seed, &mut *store)?;
        let outcome = match &summary.record {
            Some(record) => format!(
                "{} with score {} in {}s, {}% killed",
                if record.won { "won" } else { "lost" },
                format::decimal(record.score),
                format::decimal(record.play_time_secs),
                (record.enemies_killed_fraction * 100.0).round() as i32,
            ),
            None => "abandoned".to_owned(),
        };
        println!(
            "#{} {map} (level {}) difficulty {}: {outcome}; {} stacks, {} hard stack phases",
            attempt + 1,
            level_index(&config.level.level_names, &map),
            format::decimal(summary.parameter),
            summary.stacks,
            summary.hard_stacks,
        );
        if let Some(request) = summary.request {
            map = request.name;
        }
    }

    let history = LevelController::load_history(&*store);
    let board = Scoreboard::from_history(&history, config.level.level_titles.clone());
    if !board.is_empty() {
        println!();
        print!("{}", board.table(10));
    }
    Ok(())
}
