//! CLI command modules

pub mod decide;
pub mod inspect;
pub mod train;

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;

use v2v_core::{Observation, OBSERVATION_SIZE};
use v2v_rl::{AgentConfig, LearningAgent};

/// Eight observation components, in schema order
#[derive(Args, Debug, Clone)]
pub struct ObservationArgs {
    /// distance relative_speed heading road_type weather time_of_day driver_attention collision_probability
    #[arg(
        num_args = OBSERVATION_SIZE,
        value_name = "VALUE",
        allow_negative_numbers = true,
        required = true
    )]
    pub values: Vec<f64>,
}

impl ObservationArgs {
    pub fn observation(&self) -> Result<Observation> {
        Observation::from_slice(&self.values).context("Invalid observation")
    }
}

/// Build a learning agent and optionally restore a saved model into it
fn load_agent(config: &AgentConfig, model: Option<&Path>, seed: u64) -> Result<LearningAgent> {
    let mut agent =
        LearningAgent::seeded(config.clone(), seed).context("Failed to create learning agent")?;
    if let Some(path) = model {
        agent
            .load(path)
            .with_context(|| format!("Failed to load model from {}", path.display()))?;
    }
    Ok(agent)
}
