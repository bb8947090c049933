//! Observation and transition types

use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::error::{Result, V2VError};

/// Number of components in an observation
pub const OBSERVATION_SIZE: usize = 8;

/// Snapshot of the driving situation around the vehicle.
///
/// Component order is fixed:
/// 0. distance to the other vehicle (m)
/// 1. relative closing speed (m/s, positive = closing)
/// 2. relative heading angle (degrees)
/// 3. road type (0-3)
/// 4. weather condition (0-4)
/// 5. hour of day (0-23)
/// 6. driver attention (0-1)
/// 7. collision probability supplied upstream (0-1)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct Observation([f64; OBSERVATION_SIZE]);

impl Observation {
    /// Build an observation from its components, rejecting non-finite values
    pub fn new(values: [f64; OBSERVATION_SIZE]) -> Result<Self> {
        if let Some(pos) = values.iter().position(|v| !v.is_finite()) {
            return Err(V2VError::Validation(format!(
                "observation component {pos} is not a finite number"
            )));
        }
        Ok(Self(values))
    }

    /// Build an observation from a slice that must hold exactly eight values
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        let values: [f64; OBSERVATION_SIZE] = values.try_into().map_err(|_| {
            V2VError::Validation(format!(
                "observation must have {OBSERVATION_SIZE} components, got {}",
                values.len()
            ))
        })?;
        Self::new(values)
    }

    pub fn values(&self) -> &[f64; OBSERVATION_SIZE] {
        &self.0
    }

    pub fn distance(&self) -> f64 {
        self.0[0]
    }

    pub fn relative_speed(&self) -> f64 {
        self.0[1]
    }

    pub fn heading(&self) -> f64 {
        self.0[2]
    }

    pub fn road_type(&self) -> f64 {
        self.0[3]
    }

    pub fn weather(&self) -> f64 {
        self.0[4]
    }

    pub fn time_of_day(&self) -> f64 {
        self.0[5]
    }

    pub fn driver_attention(&self) -> f64 {
        self.0[6]
    }

    pub fn collision_probability(&self) -> f64 {
        self.0[7]
    }
}

impl TryFrom<Vec<f64>> for Observation {
    type Error = V2VError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        Self::from_slice(&values)
    }
}

impl TryFrom<&[f64]> for Observation {
    type Error = V2VError;

    fn try_from(values: &[f64]) -> Result<Self> {
        Self::from_slice(values)
    }
}

impl From<Observation> for Vec<f64> {
    fn from(observation: Observation) -> Self {
        observation.0.to_vec()
    }
}

/// A single stored transition (s, a, r, s', done)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    observation: Observation,
    action: Action,
    reward: f64,
    next_observation: Observation,
    done: bool,
}

impl Transition {
    pub fn new(
        observation: Observation,
        action: Action,
        reward: f64,
        next_observation: Observation,
        done: bool,
    ) -> Self {
        Self {
            observation,
            action,
            reward,
            next_observation,
            done,
        }
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn action(&self) -> Action {
        self.action
    }

    pub fn reward(&self) -> f64 {
        self.reward
    }

    pub fn next_observation(&self) -> &Observation {
        &self.next_observation
    }

    pub fn done(&self) -> bool {
        self.done
    }
}
