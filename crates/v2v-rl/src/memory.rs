//! Experience replay memory

use std::collections::VecDeque;

use rand::Rng;

use v2v_core::{Result, Transition, V2VError};

/// Default number of transitions retained
pub const DEFAULT_CAPACITY: usize = 2000;

/// Bounded FIFO store of transitions with uniform sampling
#[derive(Debug, Clone)]
pub struct ReplayMemory {
    buffer: VecDeque<Transition>,
    capacity: usize,
}

impl ReplayMemory {
    /// Create a new replay memory with given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add a transition, evicting the oldest one when full
    pub fn push(&mut self, transition: Transition) {
        if self.capacity == 0 {
            return;
        }
        if self.buffer.len() >= self.capacity {
            self.buffer.pop_front();
        }
        self.buffer.push_back(transition);
    }

    /// Draw `batch_size` distinct transitions uniformly at random.
    ///
    /// Fails with [`V2VError::InsufficientData`] when fewer are stored.
    pub fn sample<R: Rng + ?Sized>(&self, batch_size: usize, rng: &mut R) -> Result<Vec<Transition>> {
        if self.buffer.len() < batch_size {
            return Err(V2VError::InsufficientData {
                requested: batch_size,
                available: self.buffer.len(),
            });
        }

        Ok(rand::seq::index::sample(rng, self.buffer.len(), batch_size)
            .into_iter()
            .map(|i| self.buffer[i].clone())
            .collect())
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// Oldest to newest
    pub fn iter(&self) -> impl Iterator<Item = &Transition> {
        self.buffer.iter()
    }
}

impl Default for ReplayMemory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use v2v_core::{Action, Observation};

    fn transition(reward: f64) -> Transition {
        let obs = Observation::new([30.0, 4.0, 0.0, 1.0, 0.0, 10.0, 1.0, 0.2]).unwrap();
        Transition::new(obs, Action::MaintainSpeed, reward, obs, false)
    }

    #[test]
    fn test_push_and_len() {
        let mut memory = ReplayMemory::new(10);
        assert!(memory.is_empty());

        memory.push(transition(1.0));
        assert_eq!(memory.len(), 1);
        assert!(!memory.is_empty());
    }

    #[test]
    fn test_default_capacity() {
        assert_eq!(ReplayMemory::default().capacity(), 2000);
    }

    #[test]
    fn test_fifo_eviction() {
        let capacity = 5;
        let mut memory = ReplayMemory::new(capacity);
        for i in 0..=capacity {
            memory.push(transition(i as f64));
        }

        assert_eq!(memory.len(), capacity);
        let rewards: Vec<f64> = memory.iter().map(Transition::reward).collect();
        assert!(!rewards.contains(&0.0), "oldest should be evicted");
        assert!(rewards.contains(&(capacity as f64)), "newest should be present");
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let mut memory = ReplayMemory::new(3);
        for i in 0..100 {
            memory.push(transition(i as f64));
            assert!(memory.len() <= 3);
        }
    }

    #[test]
    fn test_zero_capacity_stores_nothing() {
        let mut memory = ReplayMemory::new(0);
        memory.push(transition(1.0));
        assert!(memory.is_empty());
    }

    #[test]
    fn test_sample_without_replacement() {
        let mut memory = ReplayMemory::new(100);
        for i in 0..20 {
            memory.push(transition(i as f64));
        }

        let mut rng = StdRng::seed_from_u64(7);
        let batch = memory.sample(20, &mut rng).unwrap();
        assert_eq!(batch.len(), 20);

        let distinct: HashSet<u64> = batch.iter().map(|t| t.reward().to_bits()).collect();
        assert_eq!(distinct.len(), 20);
    }

    #[test]
    fn test_sample_insufficient_data() {
        let mut memory = ReplayMemory::new(100);
        for i in 0..3 {
            memory.push(transition(i as f64));
        }

        let mut rng = StdRng::seed_from_u64(1);
        match memory.sample(4, &mut rng) {
            Err(V2VError::InsufficientData {
                requested,
                available,
            }) => {
                assert_eq!(requested, 4);
                assert_eq!(available, 3);
            }
            other => panic!("expected InsufficientData, got {other:?}"),
        }
    }

    #[test]
    fn test_sample_is_non_destructive() {
        let mut memory = ReplayMemory::new(100);
        for i in 0..10 {
            memory.push(transition(i as f64));
        }

        let before: Vec<Transition> = memory.iter().cloned().collect();
        let mut rng = StdRng::seed_from_u64(3);
        memory.sample(5, &mut rng).unwrap();
        let after: Vec<Transition> = memory.iter().cloned().collect();

        assert_eq!(before, after);
    }

    #[test]
    fn test_clear() {
        let mut memory = ReplayMemory::new(10);
        memory.push(transition(1.0));
        memory.clear();
        assert!(memory.is_empty());
    }
}
