//! Collision-avoidance maneuvers

use serde::{Deserialize, Serialize};

use crate::error::{Result, V2VError};

/// Label returned for indices outside the action space
pub const UNKNOWN_ACTION: &str = "Unknown";

/// Maneuver the vehicle can be instructed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Keep the current speed and lane
    MaintainSpeed,
    /// Ease off and reduce speed
    DecelerateGradually,
    /// Emergency braking
    HardBrake,
    /// Move into the left lane
    ChangeLaneLeft,
    /// Move into the right lane
    ChangeLaneRight,
}

impl Action {
    /// Number of discrete actions
    pub const COUNT: usize = 5;

    /// All actions in index order
    pub const ALL: [Action; Self::COUNT] = [
        Action::MaintainSpeed,
        Action::DecelerateGradually,
        Action::HardBrake,
        Action::ChangeLaneLeft,
        Action::ChangeLaneRight,
    ];

    /// Convert action to its index in the action space
    pub fn index(self) -> usize {
        match self {
            Action::MaintainSpeed => 0,
            Action::DecelerateGradually => 1,
            Action::HardBrake => 2,
            Action::ChangeLaneLeft => 3,
            Action::ChangeLaneRight => 4,
        }
    }

    /// Create action from index
    pub fn from_index(index: usize) -> Result<Self> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or_else(|| V2VError::Validation(format!("action index {index} out of range 0..5")))
    }

    /// Human-readable maneuver name
    pub fn name(self) -> &'static str {
        match self {
            Action::MaintainSpeed => "Maintain Speed",
            Action::DecelerateGradually => "Decelerate Gradually",
            Action::HardBrake => "Hard Brake",
            Action::ChangeLaneLeft => "Change Lane Left",
            Action::ChangeLaneRight => "Change Lane Right",
        }
    }

    pub fn is_lane_change(self) -> bool {
        matches!(self, Action::ChangeLaneLeft | Action::ChangeLaneRight)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl TryFrom<usize> for Action {
    type Error = V2VError;

    fn try_from(index: usize) -> Result<Self> {
        Self::from_index(index)
    }
}

impl From<Action> for usize {
    fn from(action: Action) -> Self {
        action.index()
    }
}

/// Name for a raw action index. Unknown indices map to "Unknown" instead of failing.
pub fn action_name(index: usize) -> &'static str {
    Action::from_index(index).map_or(UNKNOWN_ACTION, Action::name)
}
