//! Rule-based baseline policy

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use v2v_core::{Action, Observation};

use crate::policy::{DecisionPolicy, PerformanceStats};

/// Below this gap a closing vehicle triggers a hard brake (meters)
pub const EMERGENCY_DISTANCE_M: f64 = 10.0;
/// Below this gap a closing vehicle triggers deceleration (meters)
pub const CAUTION_DISTANCE_M: f64 = 30.0;
/// Below this gap a fast-closing vehicle triggers a lane change (meters)
pub const LANE_CHANGE_DISTANCE_M: f64 = 50.0;
/// Closing speed above which a lane change is preferred (m/s)
pub const LANE_CHANGE_SPEED_MS: f64 = 10.0;

/// Hand-written rules used as a zero-training baseline
pub struct RuleBasedAgent<R: Rng = StdRng> {
    total_actions: u64,
    collisions_avoided: u64,
    rng: R,
}

impl RuleBasedAgent<StdRng> {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for RuleBasedAgent<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RuleBasedAgent<R> {
    pub fn with_rng(rng: R) -> Self {
        info!("Rule-based agent initialized");
        Self {
            total_actions: 0,
            collisions_avoided: 0,
            rng,
        }
    }

    /// Apply the rules in order; the first match wins
    pub fn act(&mut self, observation: &Observation) -> Action {
        let distance = observation.distance();
        let relative_speed = observation.relative_speed();

        self.total_actions += 1;

        if distance < EMERGENCY_DISTANCE_M && relative_speed > 0.0 {
            return Action::HardBrake;
        }

        if distance < CAUTION_DISTANCE_M && relative_speed > 0.0 {
            return Action::DecelerateGradually;
        }

        if distance < LANE_CHANGE_DISTANCE_M && relative_speed > LANE_CHANGE_SPEED_MS {
            return if self.rng.gen_bool(0.5) {
                Action::ChangeLaneLeft
            } else {
                Action::ChangeLaneRight
            };
        }

        Action::MaintainSpeed
    }

    pub fn record_collision_avoided(&mut self) {
        self.collisions_avoided += 1;
    }

    pub fn stats(&self) -> PerformanceStats {
        PerformanceStats::from_counts(self.total_actions, self.collisions_avoided)
    }
}

impl<R: Rng> DecisionPolicy for RuleBasedAgent<R> {
    fn name(&self) -> &str {
        "rule_based"
    }

    fn act(&mut self, observation: &Observation) -> Action {
        RuleBasedAgent::act(self, observation)
    }

    fn record_collision_avoided(&mut self) {
        RuleBasedAgent::record_collision_avoided(self);
    }

    fn performance(&self) -> PerformanceStats {
        self.stats()
    }
}
