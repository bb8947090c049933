//! Sparse Q-table with lazily created rows

use std::collections::{BTreeMap, HashMap};

use v2v_core::Action;

use crate::codec::StateKey;

/// Action values for a single discrete state
pub type ActionValues = [f64; Action::COUNT];

/// Stable argmax: the lowest index wins ties
pub fn argmax(values: &ActionValues) -> Action {
    let mut best = 0;
    for (i, value) in values.iter().enumerate().skip(1) {
        if *value > values[best] {
            best = i;
        }
    }
    Action::ALL[best]
}

/// Tabular action-value function
#[derive(Debug, Clone)]
pub struct QTable {
    entries: HashMap<StateKey, ActionValues>,
    learning_rate: f64,
}

impl QTable {
    pub fn new(learning_rate: f64) -> Self {
        Self {
            entries: HashMap::new(),
            learning_rate,
        }
    }

    /// Rebuild a table wholesale from persisted rows
    pub fn from_entries(
        learning_rate: f64,
        entries: impl IntoIterator<Item = (StateKey, ActionValues)>,
    ) -> Self {
        Self {
            entries: entries.into_iter().collect(),
            learning_rate,
        }
    }

    // Sole insertion path for new rows.
    fn row_mut(&mut self, key: &StateKey) -> &mut ActionValues {
        self.entries
            .entry(key.clone())
            .or_insert([0.0; Action::COUNT])
    }

    /// Values for `key`, creating a zero row on first access
    pub fn values_for(&mut self, key: &StateKey) -> ActionValues {
        *self.row_mut(key)
    }

    /// Read-only lookup that never creates a row
    pub fn get(&self, key: &StateKey) -> Option<&ActionValues> {
        self.entries.get(key)
    }

    /// Greedy action for `key`, ties broken by lowest index
    pub fn best_action(&mut self, key: &StateKey) -> Action {
        argmax(self.row_mut(key))
    }

    /// Highest action value for `key`
    pub fn max_value(&mut self, key: &StateKey) -> f64 {
        self.row_mut(key)
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Move Q(key, action) toward `target` by the learning rate.
    /// Returns the temporal-difference error before the update.
    pub fn update(&mut self, key: &StateKey, action: Action, target: f64) -> f64 {
        let learning_rate = self.learning_rate;
        let q = &mut self.row_mut(key)[action.index()];
        let td_error = target - *q;
        *q += learning_rate * td_error;
        td_error
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.entries.iter()
    }

    /// Rows ordered by key, for stable snapshot output
    pub fn to_sorted(&self) -> BTreeMap<StateKey, ActionValues> {
        self.entries
            .iter()
            .map(|(key, values)| (key.clone(), *values))
            .collect()
    }
}
