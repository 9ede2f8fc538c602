//! Discrete actions and action spaces

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index into a fixed-size discrete action space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscreteAction(pub usize);

impl DiscreteAction {
    /// Raw action index
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl From<usize> for DiscreteAction {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Display for DiscreteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Discrete action space `[0, n)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscreteSpace {
    /// Number of discrete actions
    pub n: usize,
}

impl DiscreteSpace {
    /// Create a new discrete action space
    pub fn new(n: usize) -> crate::Result<Self> {
        if n == 0 {
            return Err(crate::RlError::config(
                "action space must contain at least one action",
            ));
        }
        Ok(Self { n })
    }

    /// Sample a uniformly random action using the caller's generator
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> DiscreteAction {
        DiscreteAction(rng.gen_range(0..self.n))
    }

    /// Check if an action is valid within this space
    #[must_use]
    pub fn contains(&self, action: DiscreteAction) -> bool {
        action.0 < self.n
    }

    /// Reject actions outside the space
    pub fn check(&self, action: DiscreteAction) -> crate::Result<()> {
        if self.contains(action) {
            Ok(())
        } else {
            Err(crate::RlError::InvalidAction {
                action: action.0,
                action_count: self.n,
            })
        }
    }

    /// Number of actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.n
    }

    /// Always false: construction rejects empty spaces
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
}
