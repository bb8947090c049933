//! Closed-loop approach scenario for training and benchmarking
//!
//! A single encounter with a vehicle ahead: the gap shrinks at the closing
//! speed, braking maneuvers reduce the closing speed, and a lane change ends
//! the encounter if there is room to merge.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use v2v_core::{Action, Observation, Result, V2VError};

use crate::risk::{collision_risk, SAFE_DISTANCE_M};

/// Simulation tick in seconds
pub const TIME_STEP_SECS: f64 = 1.0;
/// Encounter length limit
pub const MAX_STEPS: u32 = 60;
/// Gap beyond which the other vehicle is no longer relevant (meters)
pub const SEPARATION_DISTANCE_M: f64 = 200.0;
/// Smallest gap that still allows a lane change (meters)
pub const MIN_MERGE_GAP_M: f64 = 15.0;

pub const COLLISION_REWARD: f64 = -100.0;
pub const RESOLVED_REWARD: f64 = 10.0;

/// How an encounter stands after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Ongoing,
    Collision,
    Resolved,
}

/// Result of a single simulation step
#[derive(Debug, Clone, Copy)]
pub struct Step {
    pub observation: Observation,
    pub reward: f64,
    pub done: bool,
    pub outcome: Outcome,
}

fn action_cost(action: Action) -> f64 {
    match action {
        Action::MaintainSpeed => 0.1,
        Action::DecelerateGradually => 0.0,
        Action::HardBrake => -1.0,
        Action::ChangeLaneLeft | Action::ChangeLaneRight => -2.0,
    }
}

/// Closing-speed change per step for a maneuver (m/s)
fn speed_delta(action: Action, weather: f64) -> f64 {
    // Wet or icy roads (codes 3 and 4) brake less effectively
    let grip = if weather >= 3.0 { 0.6 } else { 1.0 };
    match action {
        Action::DecelerateGradually => -2.0 * grip,
        Action::HardBrake => -6.0 * grip,
        _ => 0.0,
    }
}

/// Single-lane approach simulator
pub struct ApproachScenario<R: Rng = StdRng> {
    distance: f64,
    closing_speed: f64,
    heading: f64,
    road_type: f64,
    weather: f64,
    hour: f64,
    attention: f64,
    steps: u32,
    finished: bool,
    rng: R,
}

impl ApproachScenario<StdRng> {
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> ApproachScenario<R> {
    pub fn with_rng(rng: R) -> Self {
        Self {
            distance: 0.0,
            closing_speed: 0.0,
            heading: 0.0,
            road_type: 0.0,
            weather: 0.0,
            hour: 0.0,
            attention: 1.0,
            steps: 0,
            finished: true,
            rng,
        }
    }

    /// Start a new encounter and return its first observation
    pub fn reset(&mut self) -> Result<Observation> {
        self.distance = self.rng.gen_range(20.0..150.0);
        self.closing_speed = self.rng.gen_range(-5.0..25.0);
        self.heading = self.rng.gen_range(-30.0..30.0);
        self.road_type = f64::from(self.rng.gen_range(0_u8..4));
        self.weather = f64::from(self.rng.gen_range(0_u8..5));
        self.hour = f64::from(self.rng.gen_range(0_u8..24));
        self.attention = self.rng.gen_range(0.3..1.0);
        self.steps = 0;
        self.finished = false;
        self.observation()
    }

    /// Current observation, with the heuristic risk as the collision probability
    pub fn observation(&self) -> Result<Observation> {
        Observation::new([
            self.distance,
            self.closing_speed,
            self.heading,
            self.road_type,
            self.weather,
            self.hour,
            self.attention,
            collision_risk(self.distance, self.closing_speed),
        ])
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Apply a maneuver and advance one tick
    pub fn step(&mut self, action: Action) -> Result<Step> {
        if self.finished {
            return Err(V2VError::Validation(
                "encounter finished; call reset first".to_string(),
            ));
        }
        self.steps += 1;

        let mut reward = action_cost(action);
        let outcome = if action.is_lane_change() {
            if self.distance >= MIN_MERGE_GAP_M {
                Outcome::Resolved
            } else {
                Outcome::Collision
            }
        } else {
            // The other vehicle's speed drifts slightly each tick
            let drift = self.rng.gen_range(-0.5..0.5);
            self.closing_speed += speed_delta(action, self.weather) + drift;
            self.distance -= self.closing_speed * TIME_STEP_SECS;

            if self.distance <= 0.0 {
                self.distance = 0.0;
                Outcome::Collision
            } else if self.distance > SEPARATION_DISTANCE_M
                || (self.closing_speed <= 0.0 && self.distance >= SAFE_DISTANCE_M)
                || self.steps >= MAX_STEPS
            {
                Outcome::Resolved
            } else {
                Outcome::Ongoing
            }
        };

        match outcome {
            Outcome::Collision => reward = COLLISION_REWARD,
            Outcome::Resolved => reward += RESOLVED_REWARD,
            Outcome::Ongoing => {}
        }

        let done = outcome != Outcome::Ongoing;
        self.finished = done;

        Ok(Step {
            observation: self.observation()?,
            reward,
            done,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_ranges() {
        let mut scenario = ApproachScenario::seeded(1);
        for _ in 0..100 {
            let obs = scenario.reset().unwrap();
            assert!((20.0..150.0).contains(&obs.distance()));
            assert!((-5.0..25.0).contains(&obs.relative_speed()));
            assert!((0.0..4.0).contains(&obs.road_type()));
            assert!((0.0..5.0).contains(&obs.weather()));
            assert!((0.0..24.0).contains(&obs.time_of_day()));
            assert!((0.0..=1.0).contains(&obs.collision_probability()));
        }
    }

    #[test]
    fn test_step_before_reset_fails() {
        let mut scenario = ApproachScenario::seeded(2);
        assert!(scenario.step(Action::MaintainSpeed).is_err());
    }

    #[test]
    fn test_episode_terminates() {
        let mut scenario = ApproachScenario::seeded(3);
        scenario.reset().unwrap();
        let mut steps = 0;
        loop {
            let step = scenario.step(Action::MaintainSpeed).unwrap();
            steps += 1;
            if step.done {
                assert_ne!(step.outcome, Outcome::Ongoing);
                break;
            }
        }
        assert!(steps <= MAX_STEPS);
        assert!(scenario.is_finished());
        assert!(scenario.step(Action::MaintainSpeed).is_err());
    }

    #[test]
    fn test_lane_change_with_room_resolves() {
        let mut scenario = ApproachScenario::seeded(4);
        scenario.reset().unwrap();
        // Reset always starts at least 20 m away
        let step = scenario.step(Action::ChangeLaneLeft).unwrap();
        assert_eq!(step.outcome, Outcome::Resolved);
        assert_eq!(step.reward, -2.0 + RESOLVED_REWARD);
    }

    #[test]
    fn test_lane_change_without_room_collides() {
        let mut scenario = ApproachScenario::seeded(5);
        scenario.reset().unwrap();
        scenario.distance = 5.0;
        let step = scenario.step(Action::ChangeLaneRight).unwrap();
        assert_eq!(step.outcome, Outcome::Collision);
        assert_eq!(step.reward, COLLISION_REWARD);
    }

    #[test]
    fn test_hard_brake_reduces_closing_speed() {
        let mut scenario = ApproachScenario::seeded(6);
        scenario.reset().unwrap();
        scenario.distance = 120.0;
        scenario.closing_speed = 20.0;
        scenario.weather = 0.0;

        let step = scenario.step(Action::HardBrake).unwrap();
        assert!(step.observation.relative_speed() < 15.0);
    }

    #[test]
    fn test_seeded_scenarios_agree() {
        let mut a = ApproachScenario::seeded(7);
        let mut b = ApproachScenario::seeded(7);
        assert_eq!(a.reset().unwrap(), b.reset().unwrap());
        let sa = a.step(Action::DecelerateGradually).unwrap();
        let sb = b.step(Action::DecelerateGradually).unwrap();
        assert_eq!(sa.observation, sb.observation);
        assert_eq!(sa.reward, sb.reward);
    }
}
