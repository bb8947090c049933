//! Observation discretization for Q-table lookup

use serde::{Deserialize, Serialize};

use v2v_core::{Observation, OBSERVATION_SIZE};

/// Width of a distance bin in meters
pub const DISTANCE_BIN_WIDTH: f64 = 10.0;
/// Highest distance bin; distances of 200 m and beyond share it
pub const MAX_DISTANCE_BIN: f64 = 20.0;
/// Width of a speed bin in m/s
pub const SPEED_BIN_WIDTH: f64 = 5.0;
/// Highest speed bin; |speed| of 50 m/s and beyond share it
pub const MAX_SPEED_BIN: f64 = 10.0;

const KEY_SEPARATOR: &str = "|";

/// Discrete Q-table key derived from an observation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateKey(String);

impl StateKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for StateKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&str> for StateKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl std::fmt::Display for StateKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Maps continuous observations onto discrete table keys.
///
/// Distance and speed are binned; the remaining six components are truncated
/// to integers as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct StateCodec;

impl StateCodec {
    pub fn new() -> Self {
        Self
    }

    /// Per-component bin indices in observation order
    pub fn bins(&self, observation: &Observation) -> [i64; OBSERVATION_SIZE] {
        let values = observation.values();
        let mut bins = [0_i64; OBSERVATION_SIZE];

        bins[0] = (values[0] / DISTANCE_BIN_WIDTH)
            .floor()
            .min(MAX_DISTANCE_BIN) as i64;
        bins[1] = (values[1].abs() / SPEED_BIN_WIDTH)
            .floor()
            .min(MAX_SPEED_BIN) as i64;
        for (bin, value) in bins.iter_mut().zip(values.iter()).skip(2) {
            *bin = value.trunc() as i64;
        }

        bins
    }

    /// Encode an observation into its table key
    pub fn encode(&self, observation: &Observation) -> StateKey {
        let key = self
            .bins(observation)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(KEY_SEPARATOR);
        StateKey(key)
    }
}
