//! Hyperparameters for the learning agent

use serde::{Deserialize, Serialize};

use v2v_core::{Result, V2VError};

/// Learning agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Step size of the Q-value update
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,

    /// Weight of future rewards
    #[serde(default = "default_discount_factor")]
    pub discount_factor: f64,

    /// Initial exploration rate
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,

    /// Exploration rate floor
    #[serde(default = "default_epsilon_min")]
    pub epsilon_min: f64,

    /// Multiplicative decay applied once per replay
    #[serde(default = "default_epsilon_decay")]
    pub epsilon_decay: f64,

    /// Replay memory capacity
    #[serde(default = "default_memory_capacity")]
    pub memory_capacity: usize,

    /// Transitions sampled per replay
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_learning_rate() -> f64 {
    0.001
}
fn default_discount_factor() -> f64 {
    0.95
}
fn default_epsilon() -> f64 {
    1.0
}
fn default_epsilon_min() -> f64 {
    0.01
}
fn default_epsilon_decay() -> f64 {
    0.995
}
fn default_memory_capacity() -> usize {
    2000
}
fn default_batch_size() -> usize {
    32
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            discount_factor: default_discount_factor(),
            epsilon: default_epsilon(),
            epsilon_min: default_epsilon_min(),
            epsilon_decay: default_epsilon_decay(),
            memory_capacity: default_memory_capacity(),
            batch_size: default_batch_size(),
        }
    }
}

fn check_unit_interval(name: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(V2VError::Config(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

impl AgentConfig {
    /// Check every hyperparameter is usable
    pub fn validate(&self) -> Result<()> {
        check_unit_interval("learning_rate", self.learning_rate)?;
        check_unit_interval("discount_factor", self.discount_factor)?;
        check_unit_interval("epsilon", self.epsilon)?;
        check_unit_interval("epsilon_min", self.epsilon_min)?;
        check_unit_interval("epsilon_decay", self.epsilon_decay)?;

        if self.epsilon_min > self.epsilon {
            return Err(V2VError::Config(format!(
                "epsilon_min ({}) exceeds epsilon ({})",
                self.epsilon_min, self.epsilon
            )));
        }
        if self.memory_capacity == 0 {
            return Err(V2VError::Config("memory_capacity must be positive".to_string()));
        }
        if self.batch_size == 0 {
            return Err(V2VError::Config("batch_size must be positive".to_string()));
        }
        if self.batch_size > self.memory_capacity {
            return Err(V2VError::Config(format!(
                "batch_size ({}) exceeds memory_capacity ({})",
                self.batch_size, self.memory_capacity
            )));
        }
        Ok(())
    }
}
