//! freightq CLI - freight-cost training and quoting
//!
//! Runs the full pipeline with one command:
//!
//! 1. Load: freight-cost and distance tables (`;` or `,` dialect)
//! 2. Merge: attach lane distances to freight rows
//! 3. Train: random search over boosted trees, refit, evaluate, explain
//! 4. Expand: quote every origin × target destination
//! 5. Project: re-quote the historical lanes over the horizon
//!
//! With no flags it reads `data/` and writes `output/` under the current
//! directory, matching the stock layout.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use owo_colors::OwoColorize;

use freightq::Config;
use freightq::training::print_summary;

/// Train a freight-cost model and generate quote tables
///
/// Examples:
///   freightq                               # Stock paths, seed 42
///   freightq --root ./run --seed 7         # Another layout and seed
///   freightq --report report.json -v       # Keep the training report
#[derive(Parser, Debug)]
#[command(name = "freightq")]
#[command(version)]
#[command(about, long_about = None)]
pub struct Cli {
    /// Config file (default: <root>/freightq.toml if present)
    #[arg(short, long, value_name = "TOML")]
    pub config: Option<PathBuf>,

    /// Project root; relative data and output paths resolve against it
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Seed for split, search, boosting and importance
    #[arg(long)]
    pub seed: Option<u64>,

    /// Target destination ids for expansion (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "IDS")]
    pub targets: Vec<i64>,

    /// Projection horizon in weeks
    #[arg(long, value_name = "WEEKS")]
    pub horizon: Option<usize>,

    /// Write the training report as JSON
    #[arg(long, value_name = "JSON")]
    pub report: Option<PathBuf>,

    /// Verbose output
    ///
    /// Raises the log level to debug: per-candidate CV scores and
    /// per-feature importances.
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Err(e) = freightq::logging::init(cli.verbose) {
        eprintln!("⚠️  {}", e);
    }

    let config = resolve_config(&cli)?;
    if cli.verbose {
        eprintln!("🚚 freightq v{}", env!("CARGO_PKG_VERSION"));
        eprintln!("{}", config.display_summary());
    }

    let output = freightq::pipeline::run(&config).context("freight pipeline failed")?;

    print_summary(&output.report);
    println!();
    println!(
        "  {} {} historical quotes → {}",
        "✓".green(),
        output.historical_quotes.len(),
        config.historical_quotes.display()
    );
    println!(
        "  {} {} projected quotes → {}",
        "✓".green(),
        output.projected_quotes.len(),
        config.projected_quotes.display()
    );

    if let Some(path) = &cli.report {
        let json = output
            .report
            .to_json()
            .context("failed to serialize training report")?;
        fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        println!("  {} report → {}", "✓".green(), path.display());
    }

    Ok(())
}

/// Config file (explicit or discovered) with command-line overrides applied.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load(&cli.root)
            .with_context(|| format!("failed to load config from {}", cli.root.display()))?,
    };

    if let Some(seed) = cli.seed {
        config.trainer.seed = seed;
    }
    if !cli.targets.is_empty() {
        config.target_destinations = cli.targets.clone();
    }
    if let Some(horizon) = cli.horizon {
        config.horizon = horizon;
    }

    Ok(config)
}
