// Run configuration: one JSON file with optional agent, training and grid sections

use serde::{Deserialize, Serialize};
use std::path::Path;

use mousetrap_agent::{QLearningConfig, TrainingConfig};
use mousetrap_core::Result;
use mousetrap_env::GridConfig;

/// Everything a single run needs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub agent: QLearningConfig,
    pub training: TrainingConfig,
    pub grid: GridConfig,
    pub limits: Limits,
}

/// Episode length cap applied through a time-limit wrapper
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub max_steps: usize,
    pub eval_episodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_steps: 200,
            eval_episodes: 10,
        }
    }
}

/// Command-line values that override the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub episodes: Option<usize>,
    pub seed: Option<u64>,
    pub max_steps: Option<usize>,
    pub log_interval: Option<usize>,
}

impl RunConfig {
    /// Read a JSON config file; missing sections keep their defaults
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn apply(mut self, overrides: &Overrides) -> Self {
        if let Some(episodes) = overrides.episodes {
            self.training.episodes = episodes;
        }
        if let Some(seed) = overrides.seed {
            self.agent.seed = Some(seed);
        }
        if let Some(max_steps) = overrides.max_steps {
            self.limits.max_steps = max_steps;
        }
        if let Some(log_interval) = overrides.log_interval {
            self.training.log_interval = log_interval;
        }
        self
    }
}
