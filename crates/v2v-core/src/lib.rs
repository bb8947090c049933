//! V2V Core - Observation, action, and error types
//!
//! This crate provides the foundational types shared by the decision agents
//! and the command line tools.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod error;
pub mod observation;

pub use action::{action_name, Action};
pub use error::{Result, V2VError};
pub use observation::{Observation, Transition, OBSERVATION_SIZE};
