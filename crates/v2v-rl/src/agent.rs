//! Learning agent - epsilon-greedy tabular Q-learning with experience replay

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use v2v_core::{action_name, Action, Observation, Result, Transition, V2VError};

use crate::codec::StateCodec;
use crate::config::AgentConfig;
use crate::memory::ReplayMemory;
use crate::policy::{DecisionPolicy, PerformanceStats};
use crate::q_table::QTable;
use crate::risk;
use crate::snapshot::ModelSnapshot;

/// Result of a replay call
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReplayOutcome {
    /// Not enough stored transitions yet; nothing changed
    Skipped { stored: usize, required: usize },
    /// A batch was learned from and exploration decayed
    Trained {
        batch_size: usize,
        mean_squared_td_error: f64,
        epsilon: f64,
    },
}

/// Agent statistics
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AgentStats {
    #[serde(flatten)]
    pub performance: PerformanceStats,
    pub exploration_rate: f64,
    pub memory_size: usize,
    pub table_size: usize,
}

/// Tabular Q-learning agent for collision avoidance
pub struct LearningAgent<R: Rng = StdRng> {
    config: AgentConfig,
    codec: StateCodec,
    q_table: QTable,
    memory: ReplayMemory,
    epsilon: f64,
    total_actions: u64,
    collisions_avoided: u64,
    rng: R,
}

impl LearningAgent<StdRng> {
    /// Create a new agent seeded from OS entropy
    pub fn new(config: AgentConfig) -> Result<Self> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create a new agent with a fixed seed
    pub fn seeded(config: AgentConfig, seed: u64) -> Result<Self> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> LearningAgent<R> {
    /// Create a new agent drawing all randomness from `rng`
    pub fn with_rng(config: AgentConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, rng))
    }

    fn build(config: AgentConfig, rng: R) -> Self {
        info!(
            "Learning agent initialized: learning_rate={}, discount_factor={}, epsilon={}, memory_capacity={}",
            config.learning_rate, config.discount_factor, config.epsilon, config.memory_capacity
        );

        Self {
            codec: StateCodec::new(),
            q_table: QTable::new(config.learning_rate),
            memory: ReplayMemory::new(config.memory_capacity),
            epsilon: config.epsilon,
            total_actions: 0,
            collisions_avoided: 0,
            config,
            rng,
        }
    }

    /// Epsilon-greedy action selection
    pub fn act(&mut self, observation: &Observation) -> Action {
        if self.rng.gen::<f64>() < self.epsilon {
            let action = Action::ALL[self.rng.gen_range(0..Action::COUNT)];
            debug!("Exploration: random action {}", action.index());
            return action;
        }

        let key = self.codec.encode(observation);
        let action = self.q_table.best_action(&key);
        self.total_actions += 1;
        debug!("Exploitation: action {} for state {}", action.index(), key);
        action
    }

    /// Store a transition in replay memory
    pub fn remember(
        &mut self,
        observation: Observation,
        action: Action,
        reward: f64,
        next_observation: Observation,
        done: bool,
    ) {
        self.memory.push(Transition::new(
            observation,
            action,
            reward,
            next_observation,
            done,
        ));
    }

    /// Validate raw inputs and store them as a transition.
    ///
    /// Nothing is stored unless every input is well formed.
    pub fn remember_raw(
        &mut self,
        observation: &[f64],
        action: usize,
        reward: f64,
        next_observation: &[f64],
        done: bool,
    ) -> Result<()> {
        let observation = Observation::from_slice(observation)?;
        let next_observation = Observation::from_slice(next_observation)?;
        let action = Action::from_index(action)?;
        if !reward.is_finite() {
            return Err(V2VError::Validation(format!(
                "reward must be finite, got {reward}"
            )));
        }

        self.remember(observation, action, reward, next_observation, done);
        Ok(())
    }

    /// Learn from a random batch of stored transitions.
    ///
    /// With fewer than `batch_size` transitions stored this is a no-op.
    /// Exploration decays once per call that trains.
    pub fn replay(&mut self, batch_size: usize) -> Result<ReplayOutcome> {
        if batch_size == 0 {
            return Err(V2VError::Validation(
                "replay batch size must be positive".to_string(),
            ));
        }
        if self.memory.len() < batch_size {
            return Ok(ReplayOutcome::Skipped {
                stored: self.memory.len(),
                required: batch_size,
            });
        }

        let batch = self.memory.sample(batch_size, &mut self.rng)?;
        let mut squared_error = 0.0;

        for transition in &batch {
            let key = self.codec.encode(transition.observation());
            let next_key = self.codec.encode(transition.next_observation());

            // Both rows are materialised even for terminal transitions
            self.q_table.values_for(&key);
            let next_max = self.q_table.max_value(&next_key);

            let target = if transition.done() {
                transition.reward()
            } else {
                transition.reward() + self.config.discount_factor * next_max
            };

            let td_error = self.q_table.update(&key, transition.action(), target);
            squared_error += td_error * td_error;
        }

        // A restored rate below the floor is kept as is
        if self.epsilon > self.config.epsilon_min {
            self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.epsilon_min);
        }

        let mean_squared_td_error = squared_error / batch_size as f64;
        debug!(
            "Replay complete: batch_size={}, mse={:.4}, epsilon={:.4}",
            batch_size, mean_squared_td_error, self.epsilon
        );

        Ok(ReplayOutcome::Trained {
            batch_size,
            mean_squared_td_error,
            epsilon: self.epsilon,
        })
    }

    /// Replay with the configured batch size
    pub fn train_step(&mut self) -> Result<ReplayOutcome> {
        self.replay(self.config.batch_size)
    }

    /// Heuristic collision risk; never touches learned values
    pub fn evaluate_collision_risk(&self, observation: &Observation) -> f64 {
        risk::evaluate_collision_risk(observation)
    }

    /// Human-readable name for an action index
    pub fn action_name(&self, action: usize) -> &'static str {
        action_name(action)
    }

    pub fn record_collision_avoided(&mut self) {
        self.collisions_avoided += 1;
    }

    pub fn stats(&self) -> AgentStats {
        AgentStats {
            performance: PerformanceStats::from_counts(self.total_actions, self.collisions_avoided),
            exploration_rate: self.epsilon,
            memory_size: self.memory.len(),
            table_size: self.q_table.len(),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn memory(&self) -> &ReplayMemory {
        &self.memory
    }

    pub fn codec(&self) -> &StateCodec {
        &self.codec
    }

    /// Capture the learned state
    pub fn snapshot(&self) -> ModelSnapshot {
        ModelSnapshot {
            q_table: self.q_table.to_sorted(),
            epsilon: self.epsilon,
            stats: PerformanceStats::from_counts(self.total_actions, self.collisions_avoided),
        }
    }

    /// Replace the Q-table and exploration rate from a snapshot.
    ///
    /// Replay memory and counters are kept as they are.
    pub fn restore(&mut self, snapshot: ModelSnapshot) -> Result<()> {
        snapshot.validate()?;
        self.q_table = QTable::from_entries(self.config.learning_rate, snapshot.q_table);
        self.epsilon = snapshot.epsilon;
        Ok(())
    }

    /// Save the model to `path` atomically
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.snapshot().write_atomic(path)?;
        info!("Model saved to {}", path.display());
        Ok(())
    }

    /// Load a model from `path`. On failure the current model is left untouched.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let snapshot = ModelSnapshot::read(path).inspect_err(|e| {
            warn!("Failed to load model from {}: {}", path.display(), e);
        })?;
        let table_size = snapshot.q_table.len();
        self.restore(snapshot)?;
        info!(
            "Model loaded from {} ({} states, epsilon={})",
            path.display(),
            table_size,
            self.epsilon
        );
        Ok(())
    }
}

impl Default for LearningAgent<StdRng> {
    fn default() -> Self {
        Self::build(AgentConfig::default(), StdRng::from_entropy())
    }
}

impl<R: Rng> DecisionPolicy for LearningAgent<R> {
    fn name(&self) -> &str {
        "q_learning"
    }

    fn act(&mut self, observation: &Observation) -> Action {
        LearningAgent::act(self, observation)
    }

    fn observe(&mut self, transition: Transition) -> Result<()> {
        self.memory.push(transition);
        self.train_step()?;
        Ok(())
    }

    fn record_collision_avoided(&mut self) {
        LearningAgent::record_collision_avoided(self);
    }

    fn performance(&self) -> PerformanceStats {
        self.stats().performance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(distance: f64, speed: f64) -> Observation {
        Observation::new([distance, speed, 0.0, 1.0, 0.0, 12.0, 1.0, 0.1]).unwrap()
    }

    fn greedy_config() -> AgentConfig {
        AgentConfig {
            epsilon: 0.0,
            epsilon_min: 0.0,
            learning_rate: 0.5,
            ..AgentConfig::default()
        }
    }

    #[test]
    fn test_agent_creation() {
        let agent = LearningAgent::seeded(AgentConfig::default(), 1).unwrap();
        let stats = agent.stats();
        assert_eq!(stats.exploration_rate, 1.0);
        assert_eq!(stats.memory_size, 0);
        assert_eq!(stats.table_size, 0);
        assert_eq!(stats.performance.total_actions, 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = AgentConfig {
            epsilon_decay: 2.0,
            ..AgentConfig::default()
        };
        assert!(matches!(
            LearningAgent::seeded(config, 1),
            Err(V2VError::Config(_))
        ));
    }

    #[test]
    fn test_full_exploration_skips_table_and_counters() {
        let mut agent = LearningAgent::seeded(AgentConfig::default(), 9).unwrap();
        for _ in 0..50 {
            agent.act(&obs(40.0, 5.0));
        }
        let stats = agent.stats();
        assert_eq!(stats.table_size, 0);
        assert_eq!(stats.performance.total_actions, 0);
    }

    #[test]
    fn test_exploitation_counts_and_initialises_row() {
        let mut agent = LearningAgent::seeded(greedy_config(), 2).unwrap();
        let action = agent.act(&obs(40.0, 5.0));

        assert_eq!(action, Action::MaintainSpeed);
        assert_eq!(agent.stats().performance.total_actions, 1);
        assert_eq!(agent.stats().table_size, 1);
    }

    #[test]
    fn test_remember_raw_validates_before_storing() {
        let mut agent = LearningAgent::seeded(AgentConfig::default(), 3).unwrap();
        let good = [10.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];

        assert!(agent.remember_raw(&good, 1, 1.0, &good, false).is_ok());
        assert!(matches!(
            agent.remember_raw(&good[..7], 1, 1.0, &good, false),
            Err(V2VError::Validation(_))
        ));
        assert!(agent.remember_raw(&good, 9, 1.0, &good, false).is_err());
        assert!(agent.remember_raw(&good, 1, f64::NAN, &good, false).is_err());
        assert_eq!(agent.memory().len(), 1);
    }

    #[test]
    fn test_replay_insufficient_memory_is_noop() {
        let mut agent = LearningAgent::seeded(AgentConfig::default(), 4).unwrap();
        for _ in 0..31 {
            agent.remember(obs(20.0, 5.0), Action::HardBrake, 1.0, obs(15.0, 5.0), false);
        }

        let outcome = agent.replay(32).unwrap();
        assert_eq!(
            outcome,
            ReplayOutcome::Skipped {
                stored: 31,
                required: 32
            }
        );
        assert_eq!(agent.epsilon(), 1.0);
        assert!(agent.q_table().is_empty());
    }

    #[test]
    fn test_replay_zero_batch_rejected() {
        let mut agent = LearningAgent::seeded(AgentConfig::default(), 4).unwrap();
        assert!(agent.replay(0).is_err());
    }

    #[test]
    fn test_replay_decays_once_per_call() {
        let mut agent = LearningAgent::seeded(AgentConfig::default(), 5).unwrap();
        for _ in 0..64 {
            agent.remember(obs(20.0, 5.0), Action::HardBrake, 1.0, obs(15.0, 5.0), false);
        }

        agent.replay(32).unwrap();
        assert!((agent.epsilon() - 0.995).abs() < 1e-12);
        agent.replay(64).unwrap();
        assert!((agent.epsilon() - 0.995 * 0.995).abs() < 1e-12);
    }

    #[test]
    fn test_epsilon_floor() {
        let config = AgentConfig {
            epsilon: 0.0105,
            epsilon_decay: 0.5,
            batch_size: 1,
            ..AgentConfig::default()
        };
        let mut agent = LearningAgent::seeded(config, 6).unwrap();
        agent.remember(obs(20.0, 5.0), Action::HardBrake, 1.0, obs(15.0, 5.0), true);

        for _ in 0..5 {
            agent.train_step().unwrap();
            assert!(agent.epsilon() >= 0.01);
        }
        assert_eq!(agent.epsilon(), 0.01);
    }

    #[test]
    fn test_restored_rate_below_floor_never_rises() {
        let config = AgentConfig {
            batch_size: 1,
            ..AgentConfig::default()
        };
        let mut agent = LearningAgent::seeded(config, 12).unwrap();
        agent
            .restore(ModelSnapshot::from_json(r#"{"q_table": {}, "epsilon": 0.0}"#).unwrap())
            .unwrap();
        agent.remember(obs(30.0, 4.0), Action::HardBrake, 1.0, obs(25.0, 2.0), false);

        for _ in 0..3 {
            assert!(matches!(agent.replay(1).unwrap(), ReplayOutcome::Trained { .. }));
            assert_eq!(agent.epsilon(), 0.0);
        }
    }

    #[test]
    fn test_terminal_target_is_reward() {
        let config = AgentConfig {
            batch_size: 1,
            ..greedy_config()
        };
        let mut agent = LearningAgent::seeded(config, 7).unwrap();
        let state = obs(20.0, 5.0);
        agent.remember(state, Action::HardBrake, 4.0, obs(15.0, 5.0), true);
        agent.train_step().unwrap();

        let key = agent.codec().encode(&state);
        let values = agent.q_table().get(&key).unwrap();
        // 0 + 0.5 * (4 - 0)
        assert!((values[2] - 2.0).abs() < 1e-12);
        // Next state row is created too
        assert_eq!(agent.q_table().len(), 2);
    }

    #[test]
    fn test_non_terminal_target_bootstraps() {
        let config = AgentConfig {
            batch_size: 1,
            discount_factor: 0.5,
            ..greedy_config()
        };
        let mut agent = LearningAgent::seeded(config, 8).unwrap();
        let next = obs(100.0, 0.0);

        // Teach the next state a value of 2.0 for MaintainSpeed
        agent.remember(next, Action::MaintainSpeed, 4.0, next, true);
        agent.train_step().unwrap();

        agent.memory.clear();
        let state = obs(20.0, 5.0);
        agent.remember(state, Action::DecelerateGradually, 1.0, next, false);
        agent.train_step().unwrap();

        let key = agent.codec().encode(&state);
        // target = 1 + 0.5 * 2 = 2; Q = 0.5 * 2 = 1
        assert!((agent.q_table().get(&key).unwrap()[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_learned_preference_drives_exploitation() {
        let config = AgentConfig {
            batch_size: 1,
            ..greedy_config()
        };
        let mut agent = LearningAgent::seeded(config, 10).unwrap();
        let state = obs(8.0, 6.0);
        agent.remember(state, Action::HardBrake, 10.0, obs(5.0, 1.0), true);
        agent.train_step().unwrap();

        assert_eq!(agent.act(&state), Action::HardBrake);
    }

    #[test]
    fn test_risk_does_not_touch_table() {
        let agent = LearningAgent::seeded(AgentConfig::default(), 11).unwrap();
        assert_eq!(agent.evaluate_collision_risk(&obs(0.0, 0.0)), 1.0);
        assert!((agent.evaluate_collision_risk(&obs(15.0, 0.0)) - 0.5).abs() < 1e-12);
        assert_eq!(agent.evaluate_collision_risk(&obs(100.0, 5.0)), 0.0);
        assert!(agent.q_table().is_empty());
        assert!(agent.memory().is_empty());
    }

    #[test]
    fn test_action_name_lookup() {
        let agent = LearningAgent::seeded(AgentConfig::default(), 12).unwrap();
        assert_eq!(agent.action_name(2), "Hard Brake");
        assert_eq!(agent.action_name(42), "Unknown");
    }

    #[test]
    fn test_success_rate_from_counters() {
        let mut agent = LearningAgent::seeded(greedy_config(), 13).unwrap();
        assert_eq!(agent.stats().performance.success_rate, 0.0);

        for _ in 0..4 {
            agent.act(&obs(60.0, 0.0));
        }
        agent.record_collision_avoided();

        assert_eq!(agent.stats().performance.success_rate, 0.25);
    }

    #[test]
    fn test_seeded_agents_agree() {
        let mut a = LearningAgent::seeded(AgentConfig::default(), 99).unwrap();
        let mut b = LearningAgent::seeded(AgentConfig::default(), 99).unwrap();
        for i in 0..20 {
            let o = obs(10.0 + i as f64, 3.0);
            assert_eq!(a.act(&o), b.act(&o));
        }
    }

    #[test]
    fn test_stats_serialize_flat() {
        let agent = LearningAgent::seeded(AgentConfig::default(), 14).unwrap();
        let json = serde_json::to_value(agent.stats()).unwrap();
        for field in [
            "total_actions",
            "collisions_avoided",
            "success_rate",
            "exploration_rate",
            "memory_size",
            "table_size",
        ] {
            assert!(json.get(field).is_some(), "missing {field}");
        }
    }
}
