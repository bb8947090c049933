//! V2V RL - Collision-avoidance decision agents
//!
//! This crate provides a tabular Q-learning agent with experience replay,
//! a rule-based baseline sharing the same observation schema, and a small
//! approach simulator used to train and benchmark them.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::module_name_repetitions)]

pub mod agent;
pub mod baseline;
pub mod codec;
pub mod config;
pub mod memory;
pub mod policy;
pub mod q_table;
pub mod risk;
pub mod scenario;
pub mod shared;
pub mod snapshot;
pub mod trainer;

pub use agent::{AgentStats, LearningAgent, ReplayOutcome};
pub use baseline::RuleBasedAgent;
pub use codec::{StateCodec, StateKey};
pub use config::AgentConfig;
pub use memory::ReplayMemory;
pub use policy::{DecisionPolicy, PerformanceStats};
pub use q_table::QTable;
pub use risk::evaluate_collision_risk;
pub use scenario::ApproachScenario;
pub use shared::SharedAgent;
pub use snapshot::ModelSnapshot;
pub use trainer::{EpisodeReport, RunMode, Trainer};
