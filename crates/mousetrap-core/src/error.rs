//! Error types for the mousetrap core library

use thiserror::Error;

/// Core error type for RL operations
#[derive(Error, Debug)]
pub enum RlError {
    /// Rejected hyperparameters or environment layout
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Action index outside the action space
    #[error("Invalid action {action}: action space has {action_count} actions")]
    InvalidAction {
        /// Offending action index
        action: usize,
        /// Size of the action space
        action_count: usize,
    },

    /// Reward rejected by the optional finiteness guard
    #[error("Non-finite reward: {0}")]
    NonFiniteReward(f64),

    /// Config or record that could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RlError {
    /// Shorthand for an [`RlError::InvalidConfiguration`]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Result type alias for RL operations
pub type Result<T> = std::result::Result<T, RlError>;
