//! Environments for the mousetrap Q-learning agent
//!
//! - [`GridWorld`]: the mouse-and-cheese grid
//! - [`TimeLimit`]: caps episode length for any environment

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod grid;
pub mod wrappers;

// Re-export environments
pub use grid::{GridConfig, GridWorld, Move, Tile, TileRewards, MAX_TILES};
pub use wrappers::TimeLimit;

// Re-export core types
pub use mousetrap_core::{DiscreteAction, DiscreteSpace, Environment, Reward, Step, TileIndex};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{GridConfig, GridWorld, Move, TimeLimit};
    pub use mousetrap_core::prelude::*;
}
