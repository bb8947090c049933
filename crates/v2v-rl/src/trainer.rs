//! Episode runner for training and benchmarking policies

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use v2v_core::{Result, Transition};

use crate::policy::DecisionPolicy;
use crate::scenario::{ApproachScenario, Outcome};

/// Summary of a batch of episodes
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpisodeReport {
    pub policy: String,
    pub episodes: u32,
    pub collisions: u32,
    pub collisions_avoided: u32,
    pub total_reward: f64,
    pub mean_reward: f64,
    pub mean_steps: f64,
}

impl EpisodeReport {
    /// Fraction of episodes that ended without a collision
    pub fn avoidance_rate(&self) -> f64 {
        if self.episodes > 0 {
            f64::from(self.collisions_avoided) / f64::from(self.episodes)
        } else {
            0.0
        }
    }
}

/// Whether transitions are fed back to the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Call `DecisionPolicy::observe` after every step
    Learn,
    /// Act only
    Evaluate,
}

/// Drives policies through approach encounters
pub struct Trainer<R: Rng> {
    scenario: ApproachScenario<R>,
}

impl<R: Rng> Trainer<R> {
    pub fn new(scenario: ApproachScenario<R>) -> Self {
        Self { scenario }
    }

    /// Run `episodes` encounters with `policy`.
    ///
    /// Episodes that end without a collision are credited to the policy via
    /// `record_collision_avoided`.
    pub fn run<P: DecisionPolicy + ?Sized>(
        &mut self,
        policy: &mut P,
        episodes: u32,
        mode: RunMode,
    ) -> Result<EpisodeReport> {
        let mut collisions = 0;
        let mut total_reward = 0.0;
        let mut total_steps: u64 = 0;

        for episode in 0..episodes {
            let mut observation = self.scenario.reset()?;
            let mut episode_reward = 0.0;

            let outcome = loop {
                let action = policy.act(&observation);
                let step = self.scenario.step(action)?;
                episode_reward += step.reward;
                total_steps += 1;

                if mode == RunMode::Learn {
                    policy.observe(Transition::new(
                        observation,
                        action,
                        step.reward,
                        step.observation,
                        step.done,
                    ))?;
                }

                if step.done {
                    break step.outcome;
                }
                observation = step.observation;
            };

            if outcome == Outcome::Collision {
                collisions += 1;
            } else {
                policy.record_collision_avoided();
            }
            total_reward += episode_reward;

            debug!(
                "Episode {} finished: outcome={:?}, reward={:.2}",
                episode, outcome, episode_reward
            );
        }

        let report = EpisodeReport {
            policy: policy.name().to_string(),
            episodes,
            collisions,
            collisions_avoided: episodes - collisions,
            total_reward,
            mean_reward: if episodes > 0 {
                total_reward / f64::from(episodes)
            } else {
                0.0
            },
            mean_steps: if episodes > 0 {
                total_steps as f64 / f64::from(episodes)
            } else {
                0.0
            },
        };

        info!(
            "{} run complete: {} episodes, {} collisions, mean reward {:.2}",
            report.policy, report.episodes, report.collisions, report.mean_reward
        );

        Ok(report)
    }
}
