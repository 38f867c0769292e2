//! Headless lane skirmish runner.
//!
//! Plays matches without any presentation layer and reports metrics as JSON.
//! Designed for balance sweeps and CI checks.
//!
//! # Usage
//!
//! ```bash
//! # Play one seeded match and print its metrics
//! cargo run -p skirmish_headless -- run --seed 7 --duration 600
//!
//! # Run a batch balance test with a custom balance file and map
//! cargo run -p skirmish_headless -- batch --count 200 --config balance.ron \
//!     --obstacles map.json --output results/
//!
//! # Summarize a batch result file
//! cargo run -p skirmish_headless -- summarize --input results/batch_0_200.json
//! ```
//!
//! Metrics go to stdout; logs go to stderr (`RUST_LOG` overrides `--verbose`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_headless::{
    batch::{run_batch, BatchConfig, BatchResults},
    error::{HeadlessError, Result},
    inputs::{load_balance, load_obstacles},
    runner::{run_match, MatchConfig, DEFAULT_FRAME_DELTA},
};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless lane skirmish runner for balance testing and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match and print its metrics
    Run {
        /// Random seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Optional path to also write the metrics JSON to
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        common: MatchArgs,
    },

    /// Run many seeds in parallel and write the results
    Batch {
        /// Number of matches to run
        #[arg(short, long, default_value = "100")]
        count: u32,

        /// Seed of the first match
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Maximum parallel matches (0 = number of cores)
        #[arg(short, long, default_value = "0")]
        parallel: u32,

        /// Output directory for results
        #[arg(short, long, default_value = "results")]
        output: PathBuf,

        #[command(flatten)]
        common: MatchArgs,
    },

    /// Summarize a batch result file
    Summarize {
        /// Batch results JSON
        #[arg(short, long)]
        input: PathBuf,

        /// Allowed deviation from an even split of decided matches
        #[arg(long, default_value = "0.1")]
        threshold: f64,
    },
}

/// Options shared by every command that plays matches.
#[derive(Args)]
struct MatchArgs {
    /// Match time limit in time-units
    #[arg(short, long, default_value = "600")]
    duration: f32,

    /// Balance file (RON); defaults to the embedded tables
    #[arg(long)]
    config: Option<PathBuf>,

    /// Obstacle list (RON or JSON); defaults to an open field
    #[arg(long)]
    obstacles: Option<PathBuf>,

    /// Leave the player's side without the automated ally
    #[arg(long)]
    no_ally: bool,

    /// Disable the scripted opponent
    #[arg(long)]
    no_opponent: bool,
}

impl MatchArgs {
    fn match_config(&self, seed: u64) -> MatchConfig {
        MatchConfig {
            seed,
            max_seconds: self.duration,
            frame_delta: DEFAULT_FRAME_DELTA,
            opponent_ai: !self.no_opponent,
            ally_ai: !self.no_ally,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr; stdout is for metrics
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let result = match cli.command {
        Commands::Run {
            seed,
            output,
            common,
        } => cmd_run(seed, output, &common),
        Commands::Batch {
            count,
            seed,
            parallel,
            output,
            common,
        } => cmd_batch(count, seed, parallel, output, &common),
        Commands::Summarize { input, threshold } => cmd_summarize(input, threshold),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Play a single match
fn cmd_run(seed: u64, output: Option<PathBuf>, common: &MatchArgs) -> Result<()> {
    let balance = load_balance(common.config.as_deref())?;
    let obstacles = load_obstacles(common.obstacles.as_deref())?;

    let metrics = run_match(&common.match_config(seed), &balance, &obstacles);
    let json = serde_json::to_string_pretty(&metrics)
        .map_err(|e| HeadlessError::json("<stdout>", e))?;
    println!("{json}");

    if let Some(path) = output {
        std::fs::write(&path, &json).map_err(|e| HeadlessError::io(&path, e))?;
        tracing::info!("Metrics written to {:?}", path);
    }
    Ok(())
}

/// Run a batch of matches for balance testing
fn cmd_batch(count: u32, seed: u64, parallel: u32, output: PathBuf, common: &MatchArgs) -> Result<()> {
    let balance = load_balance(common.config.as_deref())?;
    let obstacles = load_obstacles(common.obstacles.as_deref())?;

    let config = BatchConfig {
        match_count: count,
        seed_start: seed,
        parallel,
        match_config: common.match_config(seed),
    };
    let path = BatchResults::file_in(&output, &config);
    let results = run_batch(config, &balance, &obstacles);
    results.save(&path)?;

    print_summary(&results, 0.1);
    tracing::info!("Results written to {:?}", path);
    Ok(())
}

/// Print the summary of an existing result file
fn cmd_summarize(input: PathBuf, threshold: f64) -> Result<()> {
    let results = BatchResults::load(&input)?;
    print_summary(&results, threshold);
    Ok(())
}

fn print_summary(results: &BatchResults, threshold: f64) {
    let summary = &results.summary;
    println!("Matches:   {}", summary.total_matches);
    println!(
        "Red wins:  {} ({:.1}%)",
        summary.wins.red,
        summary.win_rates.red * 100.0
    );
    println!(
        "Blue wins: {} ({:.1}%)",
        summary.wins.blue,
        summary.win_rates.blue * 100.0
    );
    println!("Draws:     {}", summary.draws);
    println!(
        "Duration:  avg {:.1}, min {:.1}, max {:.1}",
        summary.avg_duration, summary.min_duration, summary.max_duration
    );
    match summary.dominant_team(threshold) {
        Some(team) => println!("Verdict:   {} dominates", team.display_name()),
        None if summary.is_balanced(threshold) => println!("Verdict:   balanced"),
        None => println!("Verdict:   inconclusive"),
    }
}
