//! Decision policy trait shared by the learned agent and the baseline

use serde::{Deserialize, Serialize};

use v2v_core::{Action, Observation, Result, Transition};

/// Counters every policy reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub total_actions: u64,
    pub collisions_avoided: u64,
    pub success_rate: f64,
}

impl PerformanceStats {
    /// Derive the success rate from the counters, guarding division by zero
    pub fn from_counts(total_actions: u64, collisions_avoided: u64) -> Self {
        let success_rate = if total_actions > 0 {
            collisions_avoided as f64 / total_actions as f64
        } else {
            0.0
        };
        Self {
            total_actions,
            collisions_avoided,
            success_rate,
        }
    }
}

/// Trait for collision-avoidance policies
pub trait DecisionPolicy {
    /// Policy name
    fn name(&self) -> &str;

    /// Choose a maneuver for the observation
    fn act(&mut self, observation: &Observation) -> Action;

    /// Feed back the outcome of the last action. Policies that do not learn ignore it.
    fn observe(&mut self, _transition: Transition) -> Result<()> {
        Ok(())
    }

    /// Count an encounter resolved without collision
    fn record_collision_avoided(&mut self);

    /// Current counters
    fn performance(&self) -> PerformanceStats;
}
