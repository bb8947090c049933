//! Single-observation commands: risk scoring and maneuver selection

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tracing::debug;

use v2v_rl::risk::time_to_collision;
use v2v_rl::{evaluate_collision_risk, RuleBasedAgent};

use super::{load_agent, ObservationArgs};
use crate::config::Config;

#[derive(Args, Debug)]
pub struct DecideArgs {
    #[command(flatten)]
    pub observation: ObservationArgs,

    /// Saved model to act from (exploration rate is taken from the file)
    #[arg(short, long)]
    pub model: Option<PathBuf>,

    /// Use the rule-based baseline instead of the learning agent
    #[arg(short, long, conflicts_with = "model")]
    pub baseline: bool,
}

pub fn risk(args: &ObservationArgs) -> Result<()> {
    let observation = args.observation()?;
    let risk = evaluate_collision_risk(&observation);

    println!("Collision risk: {risk:.3}");
    match time_to_collision(&observation) {
        Some(ttc) => println!("Time to collision: {ttc:.2}s"),
        None => println!("Time to collision: not closing"),
    }
    Ok(())
}

pub fn decide(args: &DecideArgs, config: &Config) -> Result<()> {
    let observation = args.observation.observation()?;

    let (policy, action) = if args.baseline {
        let mut baseline = RuleBasedAgent::seeded(config.simulation.seed);
        ("rule_based", baseline.act(&observation))
    } else {
        let mut agent = load_agent(&config.agent, args.model.as_deref(), config.simulation.seed)?;
        debug!("Deciding with exploration rate {:.3}", agent.epsilon());
        ("q_learning", agent.act(&observation))
    };

    println!("Policy: {policy}");
    println!("Action: {} ({})", action.index(), action);
    println!("Collision risk: {:.3}", evaluate_collision_risk(&observation));
    Ok(())
}
