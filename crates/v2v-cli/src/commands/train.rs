//! Training and benchmarking commands

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::json;
use tracing::info;

use v2v_rl::{
    ApproachScenario, DecisionPolicy, EpisodeReport, LearningAgent, ModelSnapshot, RuleBasedAgent,
    RunMode, Trainer,
};

use super::load_agent;
use crate::config::Config;

#[derive(Args, Debug)]
pub struct TrainArgs {
    /// Number of training episodes [default: simulation.episodes]
    #[arg(short, long)]
    pub episodes: Option<u32>,

    /// Where to save the trained model [default: simulation.model_path]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// RNG seed [default: simulation.seed]
    #[arg(short, long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Number of evaluation episodes per policy [default: simulation.episodes]
    #[arg(short, long)]
    pub episodes: Option<u32>,

    /// Saved model to evaluate; trains a fresh agent when omitted
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// RNG seed [default: simulation.seed]
    #[arg(short, long)]
    pub seed: Option<u64>,
}

pub fn train(args: &TrainArgs, config: &Config) -> Result<()> {
    let episodes = args.episodes.unwrap_or(config.simulation.episodes);
    let seed = args.seed.unwrap_or(config.simulation.seed);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| config.simulation.model_path.clone());

    let (agent, report) = train_agent(config, episodes, seed)?;
    agent
        .save(&output)
        .with_context(|| format!("Failed to save model to {}", output.display()))?;

    let stats = agent.stats();
    println!("Training complete");
    println!("=================");
    print_report(&report);
    println!("  States learned:   {}", stats.table_size);
    println!("  Exploration rate: {:.4}", stats.exploration_rate);
    println!("  Model saved to:   {}", output.display());
    Ok(())
}

pub fn compare(args: &CompareArgs, config: &Config) -> Result<()> {
    let episodes = args.episodes.unwrap_or(config.simulation.episodes);
    let seed = args.seed.unwrap_or(config.simulation.seed);

    let snapshot = match &args.model {
        Some(path) => ModelSnapshot::read(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?,
        None => {
            info!("No model given, training a fresh agent for {} episodes", episodes);
            train_agent(config, episodes, seed)?.0.snapshot()
        }
    };

    // Evaluate greedily on a fresh agent so counters only cover evaluation
    let mut learner = load_agent(&config.agent, None, seed)?;
    learner.restore(ModelSnapshot {
        epsilon: 0.0,
        ..snapshot
    })?;

    let mut baseline = RuleBasedAgent::seeded(seed);
    let eval_seed = seed.wrapping_add(1);

    let learned = evaluate(&mut learner, episodes, eval_seed)?;
    let rules = evaluate(&mut baseline, episodes, eval_seed)?;

    let output = json!({
        "episodes": episodes,
        "seed": eval_seed,
        "q_learning": {
            "report": learned,
            "avoidance_rate": learned.avoidance_rate(),
            "stats": learner.stats(),
        },
        "rule_based": {
            "report": rules,
            "avoidance_rate": rules.avoidance_rate(),
            "stats": baseline.stats(),
        },
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn train_agent(
    config: &Config,
    episodes: u32,
    seed: u64,
) -> Result<(LearningAgent, EpisodeReport)> {
    let mut agent = load_agent(&config.agent, None, seed)?;
    let report = Trainer::new(ApproachScenario::seeded(seed))
        .run(&mut agent, episodes, RunMode::Learn)
        .context("Training run failed")?;
    Ok((agent, report))
}

fn evaluate<P: DecisionPolicy>(policy: &mut P, episodes: u32, seed: u64) -> Result<EpisodeReport> {
    Trainer::new(ApproachScenario::seeded(seed))
        .run(policy, episodes, RunMode::Evaluate)
        .with_context(|| format!("Evaluation of {} failed", policy.name()))
}

fn print_report(report: &EpisodeReport) {
    println!("  Policy:           {}", report.policy);
    println!("  Episodes:         {}", report.episodes);
    println!("  Collisions:       {}", report.collisions);
    println!(
        "  Avoided:          {} ({:.1}%)",
        report.collisions_avoided,
        report.avoidance_rate() * 100.0
    );
    println!("  Mean reward:      {:.2}", report.mean_reward);
    println!("  Mean steps:       {:.1}", report.mean_steps);
}
