//! Core reinforcement learning traits and types for mousetrap
//!
//! This crate provides the foundational abstractions shared by the agent
//! and environment crates: state and action identifiers, the environment
//! and agent traits, the tabular value store and epsilon-greedy
//! exploration.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod action;
pub mod agent;
pub mod environment;
pub mod error;
pub mod policy;
pub mod reward;
pub mod state;
pub mod value;

// Re-export core traits and types
pub use action::{DiscreteAction, DiscreteSpace};
pub use agent::{Agent, AgentMetrics, Learning};
pub use environment::{Environment, Episode, Step, StepInfo, TrackedEnvironment};
pub use error::{Result, RlError};
pub use policy::{EpsilonGreedy, EPSILON_DECAY, EPSILON_FLOOR_FACTOR};
pub use reward::Reward;
pub use state::{StateKey, Terminal, TileIndex};
pub use value::ValueTable;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Agent, DiscreteAction, DiscreteSpace, Environment, Learning, Result, Reward, StateKey,
        Step, TileIndex,
    };
}
