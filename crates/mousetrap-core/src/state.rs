//! State identifiers

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::hash::Hash;

/// Opaque identifier for an environment configuration.
///
/// The agent only hashes and compares states; it never looks inside them.
/// Anything that is `Clone + Eq + Hash` qualifies: integers, strings,
/// tuples of coordinates.
pub trait StateKey: Clone + Eq + Hash + Debug + Send + Sync {}

impl<T> StateKey for T where T: Clone + Eq + Hash + Debug + Send + Sync {}

/// Index of a tile in a grid environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TileIndex(pub usize);

impl TileIndex {
    /// Raw index value
    #[must_use]
    pub fn get(self) -> usize {
        self.0
    }
}

impl From<usize> for TileIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for TileIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Terminal state indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Terminal {
    /// Not a terminal state
    No,
    /// Terminal state (episode ends)
    Yes,
    /// Truncated (time limit reached)
    Truncated,
}

impl Terminal {
    /// Check if the state is terminal (either Yes or Truncated)
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::No)
    }

    /// Build from the `done` / `truncated` flags of a step
    #[must_use]
    pub fn from_flags(done: bool, truncated: bool) -> Self {
        match (done, truncated) {
            (_, true) => Self::Truncated,
            (true, false) => Self::Yes,
            (false, false) => Self::No,
        }
    }
}
