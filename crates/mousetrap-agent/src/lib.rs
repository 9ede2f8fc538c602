//! Reinforcement learning agents for mousetrap
//!
//! This crate provides:
//! - [`QLearningAgent`]: tabular Q-learning with a decaying epsilon-greedy policy
//! - [`RandomAgent`]: a uniform random baseline
//! - [`train`] / [`evaluate`]: explicit loops that drive an agent against
//!   any [`Environment`](mousetrap_core::Environment)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod q_learning;
pub mod random;
pub mod trainer;

// Re-export agents
pub use q_learning::{QLearningAgent, QLearningConfig};
pub use random::RandomAgent;

// Re-export the training loop
pub use trainer::{evaluate, train, EpisodeStats, TrainingConfig, TrainingSummary};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        evaluate, train, QLearningAgent, QLearningConfig, RandomAgent, TrainingConfig,
        TrainingSummary,
    };
    pub use mousetrap_core::prelude::*;
}
