//! Dilemma League CLI
//!
//! Loads a directory of strategy submissions, runs the full round-robin
//! league and writes the CSV report to the working directory.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;

use league_logic::{aggregate, file_name, render, run_league, StrategyRegistry};

#[derive(Parser)]
#[command(name = "dilemma-league")]
#[command(about = "Iterated Prisoner's Dilemma league runner")]
struct Cli {
    /// Directory containing strategy submissions
    #[arg(long, default_value = "strategies")]
    directory: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let registry = StrategyRegistry::load(&cli.directory)
        .with_context(|| format!("loading strategies from {}", cli.directory.display()))?;
    tracing::info!(strategies = registry.len(), "registry loaded");

    let mut rng = rand::thread_rng();
    let outcome = run_league(&registry, &mut rng)?;

    let board = aggregate(&registry.callables(), &outcome.records)?;
    let report = render(registry.entries(), &board, outcome.rounds);

    let path = file_name(Utc::now().timestamp());
    fs::write(&path, report).with_context(|| format!("writing {path}"))?;

    println!("{path} was successfully generated");
    Ok(())
}
