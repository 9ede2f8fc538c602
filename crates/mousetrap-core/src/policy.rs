//! Epsilon-greedy exploration

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{DiscreteAction, DiscreteSpace, RlError};

/// Multiplicative decay applied to ε on every selection
pub const EPSILON_DECAY: f64 = 0.995;

/// Second branch of the decay rule, `ε × 0.005`.
///
/// It is always the smaller branch, so it never binds. ε keeps shrinking
/// into the subnormal range until `ε × 0.995` rounds back to ε (around
/// 5e-322); that fixed point is the de facto floor.
pub const EPSILON_FLOOR_FACTOR: f64 = 0.005;

/// Exploration rate with a per-call multiplicative decay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    /// Current exploration rate
    epsilon: f64,
    /// Skip the decay step (evaluation mode)
    frozen: bool,
}

impl EpsilonGreedy {
    /// Create a new epsilon-greedy schedule starting at `epsilon`
    pub fn new(epsilon: f64) -> crate::Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(RlError::config(format!(
                "initial epsilon must lie in [0, 1], got {epsilon}"
            )));
        }
        Ok(Self {
            epsilon,
            frozen: false,
        })
    }

    /// Current exploration rate
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Set the exploration rate, clamped to [0, 1].
    ///
    /// NaN is rejected: it would fail every `u < ε` draw and silently turn
    /// exploration off.
    pub fn set_epsilon(&mut self, epsilon: f64) -> crate::Result<()> {
        if epsilon.is_nan() {
            return Err(RlError::config("epsilon must not be NaN"));
        }
        self.epsilon = epsilon.clamp(0.0, 1.0);
        Ok(())
    }

    /// Stop or resume the per-call decay
    pub fn set_frozen(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    /// Whether the decay is currently skipped
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Apply one decay step and return the new ε
    pub fn decay(&mut self) -> f64 {
        if !self.frozen {
            self.epsilon = (self.epsilon * EPSILON_DECAY).max(self.epsilon * EPSILON_FLOOR_FACTOR);
        }
        self.epsilon
    }

    /// Decay, then explore with probability ε or fall back to `greedy`.
    ///
    /// Returns the chosen action and the ε used for the decision.
    pub fn choose<R, F>(
        &mut self,
        rng: &mut R,
        space: DiscreteSpace,
        greedy: F,
    ) -> (DiscreteAction, f64)
    where
        R: Rng + ?Sized,
        F: FnOnce() -> usize,
    {
        let epsilon = self.decay();
        if rng.gen::<f64>() < epsilon {
            (space.sample(rng), epsilon)
        } else {
            (DiscreteAction(greedy()), epsilon)
        }
    }
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self {
            epsilon: 1.0,
            frozen: false,
        }
    }
}
