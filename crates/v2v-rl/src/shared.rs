//! Thread-safe handle to a single learning agent
//!
//! All agent state sits behind one lock, so a replay never interleaves with
//! an `act` against the same table.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use rand::rngs::StdRng;
use rand::Rng;

use v2v_core::{Action, Observation, Result, V2VError};

use crate::agent::{AgentStats, LearningAgent, ReplayOutcome};

/// Cloneable handle sharing one [`LearningAgent`] between threads
pub struct SharedAgent<R: Rng = StdRng> {
    inner: Arc<Mutex<LearningAgent<R>>>,
}

impl<R: Rng> Clone for SharedAgent<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Rng> SharedAgent<R> {
    pub fn new(agent: LearningAgent<R>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(agent)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LearningAgent<R>>> {
        self.inner
            .lock()
            .map_err(|e| V2VError::Lock(format!("agent lock poisoned: {e}")))
    }

    pub fn act(&self, observation: &Observation) -> Result<Action> {
        Ok(self.lock()?.act(observation))
    }

    pub fn remember(
        &self,
        observation: Observation,
        action: Action,
        reward: f64,
        next_observation: Observation,
        done: bool,
    ) -> Result<()> {
        self.lock()?
            .remember(observation, action, reward, next_observation, done);
        Ok(())
    }

    pub fn replay(&self, batch_size: usize) -> Result<ReplayOutcome> {
        self.lock()?.replay(batch_size)
    }

    pub fn record_collision_avoided(&self) -> Result<()> {
        self.lock()?.record_collision_avoided();
        Ok(())
    }

    pub fn stats(&self) -> Result<AgentStats> {
        Ok(self.lock()?.stats())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        self.lock()?.save(path)
    }

    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        self.lock()?.load(path)
    }

    /// Run `f` with exclusive access to the agent
    pub fn with_agent<T>(&self, f: impl FnOnce(&mut LearningAgent<R>) -> T) -> Result<T> {
        let mut agent = self.lock()?;
        Ok(f(&mut *agent))
    }
}
