//! V2V CLI - Command line interface for the collision-avoidance agents
//!
//! Scores observations, trains and saves Q-learning models, and compares
//! them against the rule-based baseline on simulated approach encounters.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use crate::commands::decide::{self, DecideArgs};
use crate::commands::train::{self, CompareArgs, TrainArgs};
use crate::commands::{inspect, ObservationArgs};
use crate::config::Config;

#[derive(Parser)]
#[command(name = "v2v")]
#[command(author, version, about = "V2V - collision-avoidance decision agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the collision risk of an observation
    Risk(ObservationArgs),

    /// Choose a maneuver for an observation
    Decide(DecideArgs),

    /// Train a Q-learning agent on simulated encounters and save it
    Train(TrainArgs),

    /// Benchmark a learned agent against the rule-based baseline
    Compare(CompareArgs),

    /// Show a summary of a saved model
    Inspect {
        /// Model file
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;

    // Initialize logging based on verbosity
    let log_level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("v2v={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match &config.source {
        Some(path) => tracing::debug!("Loaded config from: {:?}", path),
        None => tracing::debug!("No config file found, using defaults"),
    }

    match cli.command {
        Commands::Risk(args) => decide::risk(&args),
        Commands::Decide(args) => decide::decide(&args, &config),
        Commands::Train(args) => train::train(&args, &config),
        Commands::Compare(args) => train::compare(&args, &config),
        Commands::Inspect { file } => inspect::inspect(&file),
    }
}
