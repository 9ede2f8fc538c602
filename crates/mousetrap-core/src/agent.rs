//! Agent traits and types

use serde::{Deserialize, Serialize};

use crate::{DiscreteAction, Reward, StateKey};

/// Core agent trait.
///
/// Both calls are synchronous: an agent never suspends or spawns work, and
/// is driven by exactly one control loop.
pub trait Agent {
    /// State type the agent keys its knowledge on
    type State: StateKey;

    /// Select an action for `state`
    fn act(&mut self, state: &Self::State) -> DiscreteAction;

    /// Learn from one `(state, action, reward, next_state)` transition
    fn observe(
        &mut self,
        _state: &Self::State,
        _action: DiscreteAction,
        _reward: Reward,
        _next_state: &Self::State,
    ) -> crate::Result<()> {
        Ok(()) // Default: no learning
    }

    /// Get agent metrics
    fn metrics(&self) -> AgentMetrics {
        AgentMetrics::default()
    }
}

/// Trait for agents whose learning can be switched off
pub trait Learning: Agent {
    /// Set training mode
    fn set_training(&mut self, training: bool);

    /// Check if in training mode
    fn is_training(&self) -> bool;
}

/// Agent metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    /// Total actions selected
    pub total_steps: usize,
    /// Total value updates applied
    pub total_updates: usize,
    /// Current exploration rate, if the agent explores
    pub epsilon: Option<f64>,
    /// Number of states with a value row
    pub states_discovered: usize,
}
