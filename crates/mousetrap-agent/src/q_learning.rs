//! Tabular Q-learning agent with epsilon-greedy exploration

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use mousetrap_core::{
    Agent, AgentMetrics, DiscreteAction, DiscreteSpace, EpsilonGreedy, Learning, Result, Reward,
    RlError, StateKey, ValueTable,
};

/// Q-learning hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QLearningConfig {
    /// Number of discrete actions
    pub action_count: usize,
    /// Learning rate α, in (0, 1]
    pub learning_rate: f64,
    /// Discount factor γ, in [0, 1]
    pub discount_factor: f64,
    /// Starting exploration rate ε, in [0, 1]
    pub initial_epsilon: f64,
    /// Seed for the agent's generator; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Refuse NaN and infinite rewards instead of writing them to the table
    pub reject_non_finite_rewards: bool,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            action_count: 4,
            learning_rate: 0.3,
            discount_factor: 0.8,
            initial_epsilon: 1.0,
            seed: None,
            reject_non_finite_rewards: false,
        }
    }
}

impl QLearningConfig {
    /// Check every hyperparameter against its allowed range
    pub fn validate(&self) -> Result<()> {
        if self.action_count == 0 {
            return Err(RlError::config("action_count must be positive"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(RlError::config(format!(
                "learning_rate must lie in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if !(0.0..=1.0).contains(&self.discount_factor) {
            return Err(RlError::config(format!(
                "discount_factor must lie in [0, 1], got {}",
                self.discount_factor
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_epsilon) {
            return Err(RlError::config(format!(
                "initial_epsilon must lie in [0, 1], got {}",
                self.initial_epsilon
            )));
        }
        Ok(())
    }
}

/// Q-learning agent over an opaque state type.
///
/// Owns its value table, its exploration schedule and a single random
/// generator that is advanced on every selection. Two agents built from the
/// same config and seed follow identical trajectories.
#[derive(Debug, Clone)]
pub struct QLearningAgent<S, R = StdRng> {
    config: QLearningConfig,
    table: ValueTable<S>,
    exploration: EpsilonGreedy,
    action_space: DiscreteSpace,
    rng: R,
    total_steps: usize,
    total_updates: usize,
}

impl<S: StateKey> QLearningAgent<S, StdRng> {
    /// Create an agent whose generator is seeded from `config.seed`
    pub fn new(config: QLearningConfig) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }
}

impl<S: StateKey, R: Rng> QLearningAgent<S, R> {
    /// Create an agent driven by an injected generator
    pub fn with_rng(config: QLearningConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            table: ValueTable::new(config.action_count)?,
            exploration: EpsilonGreedy::new(config.initial_epsilon)?,
            action_space: DiscreteSpace::new(config.action_count)?,
            config,
            rng,
            total_steps: 0,
            total_updates: 0,
        })
    }

    /// Decay ε, then pick a random action with probability ε or the
    /// first-best action at `state` otherwise.
    ///
    /// Returns the action and the ε that governed the choice. ε is decayed
    /// on every call while training, including calls made only to evaluate.
    pub fn select_action(&mut self, state: &S) -> (DiscreteAction, f64) {
        self.total_steps += 1;
        let table = &mut self.table;
        self.exploration
            .choose(&mut self.rng, self.action_space, || table.best_value(state).1)
    }

    /// One-step Q-learning update for `(state, action)`.
    ///
    /// The blended prior is the best value over all actions at `state`,
    /// not the stored `Q(state, action)`:
    ///
    /// `Q(s, a) ← (1 − α)·max Q(s, ·) + α·(r + γ·max Q(s', ·))`
    ///
    /// There is no terminal handling; episode ends reach the agent only
    /// through `reward` and `next_state`.
    pub fn apply_update(
        &mut self,
        state: &S,
        action: DiscreteAction,
        reward: f64,
        next_state: &S,
    ) -> Result<()> {
        self.action_space.check(action)?;
        if self.config.reject_non_finite_rewards && !reward.is_finite() {
            warn!(?state, %action, reward, "rejecting non-finite reward");
            return Err(RlError::NonFiniteReward(reward));
        }

        let (current_best, _) = self.table.best_value(state);
        let (future_best, _) = self.table.best_value(next_state);
        let alpha = self.config.learning_rate;
        let gamma = self.config.discount_factor;

        self.table.values_mut(state)[action.index()] =
            (1.0 - alpha) * current_best + alpha * (reward + gamma * future_best);
        self.total_updates += 1;
        Ok(())
    }

    /// The learned value table
    #[must_use]
    pub fn table(&self) -> &ValueTable<S> {
        &self.table
    }

    /// Current exploration rate
    #[must_use]
    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon()
    }

    /// Override the exploration rate (clamped to [0, 1], NaN rejected)
    pub fn set_epsilon(&mut self, epsilon: f64) -> Result<()> {
        self.exploration.set_epsilon(epsilon)
    }

    /// Construction-time hyperparameters
    #[must_use]
    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    /// Action space the agent chooses from
    #[must_use]
    pub fn action_space(&self) -> DiscreteSpace {
        self.action_space
    }
}

impl<S: StateKey, R: Rng> Agent for QLearningAgent<S, R> {
    type State = S;

    fn act(&mut self, state: &S) -> DiscreteAction {
        self.select_action(state).0
    }

    fn observe(
        &mut self,
        state: &S,
        action: DiscreteAction,
        reward: Reward,
        next_state: &S,
    ) -> Result<()> {
        self.apply_update(state, action, reward.value(), next_state)
    }

    fn metrics(&self) -> AgentMetrics {
        AgentMetrics {
            total_steps: self.total_steps,
            total_updates: self.total_updates,
            epsilon: Some(self.epsilon()),
            states_discovered: self.table.len(),
        }
    }
}

impl<S: StateKey, R: Rng> Learning for QLearningAgent<S, R> {
    fn set_training(&mut self, training: bool) {
        self.exploration.set_frozen(!training);
    }

    fn is_training(&self) -> bool {
        !self.exploration.is_frozen()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::mock::StepRng;
    use statrs::distribution::{ChiSquared, ContinuousCDF};

    fn scenario_config() -> QLearningConfig {
        QLearningConfig {
            action_count: 4,
            learning_rate: 0.3,
            discount_factor: 0.8,
            seed: Some(17),
            ..QLearningConfig::default()
        }
    }

    #[test]
    fn test_zero_actions_is_invalid_configuration() {
        let config = QLearningConfig {
            action_count: 0,
            ..QLearningConfig::default()
        };
        assert!(matches!(
            QLearningAgent::<u32>::new(config),
            Err(RlError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_out_of_range_hyperparameters_rejected() {
        for config in [
            QLearningConfig {
                learning_rate: 0.0,
                ..QLearningConfig::default()
            },
            QLearningConfig {
                learning_rate: 1.5,
                ..QLearningConfig::default()
            },
            QLearningConfig {
                discount_factor: -0.1,
                ..QLearningConfig::default()
            },
            QLearningConfig {
                discount_factor: f64::NAN,
                ..QLearningConfig::default()
            },
            QLearningConfig {
                initial_epsilon: 2.0,
                ..QLearningConfig::default()
            },
        ] {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
        assert!(QLearningConfig::default().validate().is_ok());
    }

    #[test]
    fn test_single_update_arithmetic() {
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        agent.apply_update(&"s", DiscreteAction(2), 5.0, &"n").unwrap();

        let row = agent.table().values(&"s").unwrap();
        assert_relative_eq!(row[2], 1.5);
        assert_eq!(row[0], 0.0);
        assert_eq!(row[1], 0.0);
        assert_eq!(row[3], 0.0);
        assert_eq!(agent.table().values(&"n"), Some(&[0.0; 4][..]));
    }

    #[test]
    fn test_chained_update_blends_best_value() {
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        agent.apply_update(&"s", DiscreteAction(2), 5.0, &"n").unwrap();
        agent.apply_update(&"s", DiscreteAction(2), 5.0, &"n").unwrap();

        assert_relative_eq!(agent.table().values(&"s").unwrap()[2], 2.55, epsilon = 1e-12);
    }

    #[test]
    fn test_prior_is_best_of_state_not_stored_entry() {
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        agent.apply_update(&"s", DiscreteAction(2), 5.0, &"n").unwrap();
        // Q(s, 0) starts at 0 but the blended prior is max Q(s, ·) = 1.5
        agent.apply_update(&"s", DiscreteAction(0), 0.0, &"n").unwrap();

        assert_relative_eq!(agent.table().values(&"s").unwrap()[0], 0.7 * 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_future_value_is_discounted() {
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        agent.apply_update(&"n", DiscreteAction(1), 10.0, &"z").unwrap(); // Q(n, 1) = 3.0
        agent.apply_update(&"s", DiscreteAction(3), 0.0, &"n").unwrap();

        let row = agent.table().values(&"s").unwrap();
        assert_relative_eq!(row[3], 0.3 * 0.8 * 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_out_of_range_action_rejected() {
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        assert!(matches!(
            agent.apply_update(&1_u8, DiscreteAction(4), 1.0, &2),
            Err(RlError::InvalidAction {
                action: 4,
                action_count: 4,
            })
        ));
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_non_finite_reward_propagates_by_default() {
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        agent.apply_update(&1_u8, DiscreteAction(0), f64::NAN, &2).unwrap();
        assert!(agent.table().values(&1).unwrap()[0].is_nan());
    }

    #[test]
    fn test_non_finite_reward_guard() {
        let config = QLearningConfig {
            reject_non_finite_rewards: true,
            ..scenario_config()
        };
        let mut agent = QLearningAgent::new(config).unwrap();
        assert!(matches!(
            agent.apply_update(&1_u8, DiscreteAction(0), f64::INFINITY, &2),
            Err(RlError::NonFiniteReward(r)) if r.is_infinite()
        ));
        assert!(agent.table().is_empty());
        assert_eq!(agent.metrics().total_updates, 0);
    }

    #[test]
    fn test_greedy_selection_defaults_to_first_action() {
        let config = QLearningConfig {
            initial_epsilon: 0.0,
            ..scenario_config()
        };
        let mut agent = QLearningAgent::new(config).unwrap();
        let (action, epsilon) = agent.select_action(&(0_i32, 0_i32));
        assert_eq!(action, DiscreteAction(0));
        assert_eq!(epsilon, 0.0);
        // exploitation discovers the state
        assert!(agent.table().contains(&(0, 0)));
    }

    #[test]
    fn test_greedy_selection_follows_learned_values() {
        let config = QLearningConfig {
            initial_epsilon: 0.0,
            ..scenario_config()
        };
        let mut agent = QLearningAgent::new(config).unwrap();
        agent.apply_update(&7_u32, DiscreteAction(3), 1.0, &8).unwrap();
        assert_eq!(agent.select_action(&7).0, DiscreteAction(3));
    }

    #[test]
    fn test_exploration_leaves_table_untouched() {
        // a zero draw is always below ε, so every call explores
        let mut agent = QLearningAgent::with_rng(scenario_config(), StepRng::new(0, 0)).unwrap();
        let (action, epsilon) = agent.select_action(&"unseen");
        assert_eq!(action, DiscreteAction(0));
        assert_relative_eq!(epsilon, 0.995);
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_epsilon_decays_on_every_call() {
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        let mut previous = agent.epsilon();
        for step in 0..500_u32 {
            let (_, epsilon) = agent.select_action(&(step % 9));
            assert!(epsilon < previous);
            assert_eq!(epsilon, agent.epsilon());
            previous = epsilon;
        }
        assert_relative_eq!(agent.epsilon(), 0.995_f64.powi(500), max_relative = 1e-9);
    }

    #[test]
    fn test_training_off_freezes_epsilon() {
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        agent.select_action(&0_u8);
        agent.set_training(false);
        assert!(!agent.is_training());
        let frozen = agent.epsilon();
        for _ in 0..50 {
            assert_eq!(agent.select_action(&0).1, frozen);
        }
        agent.set_training(true);
        assert!(agent.select_action(&0).1 < frozen);
    }

    #[test]
    fn test_exploration_is_roughly_uniform() {
        const SAMPLES: usize = 40_000;
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        agent.set_epsilon(1.0).unwrap();
        agent.set_training(false);

        let mut counts = [0_usize; 4];
        for i in 0..SAMPLES {
            counts[agent.select_action(&i).0.index()] += 1;
        }

        let expected = SAMPLES as f64 / 4.0;
        let statistic: f64 = counts
            .iter()
            .map(|&observed| (observed as f64 - expected).powi(2) / expected)
            .sum();
        let critical = ChiSquared::new(3.0).unwrap().inverse_cdf(0.9999);
        assert!(statistic < critical, "chi-square {statistic} >= {critical}, counts {counts:?}");
        assert!(agent.table().is_empty());
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let mut first = QLearningAgent::new(scenario_config()).unwrap();
        let mut second = QLearningAgent::new(scenario_config()).unwrap();

        let mut state = 0_u32;
        for _ in 0..2_000 {
            let (a1, e1) = first.select_action(&state);
            let (a2, e2) = second.select_action(&state);
            assert_eq!(a1, a2);
            assert_eq!(e1, e2);

            let next = (state * 7 + a1.index() as u32 + 1) % 36;
            let reward = if next == 35 { 100.0 } else { -1.0 };
            first.apply_update(&state, a1, reward, &next).unwrap();
            second.apply_update(&state, a2, reward, &next).unwrap();
            assert_eq!(first.table().values(&state), second.table().values(&state));
            state = next;
        }
        assert_eq!(first.metrics(), second.metrics());
    }

    #[test]
    fn test_scripted_generator_is_reproducible() {
        let script = || StepRng::new(u64::MAX / 3, 0x9E37_79B9_7F4A_7C15);
        let mut first = QLearningAgent::with_rng(scenario_config(), script()).unwrap();
        let mut second = QLearningAgent::with_rng(scenario_config(), script()).unwrap();
        for state in 0..300_u32 {
            assert_eq!(first.select_action(&state), second.select_action(&state));
        }
    }

    #[test]
    fn test_metrics_track_calls() {
        let mut agent = QLearningAgent::new(scenario_config()).unwrap();
        let action = agent.act(&1_u8);
        agent.observe(&1, action, Reward(1.0), &2).unwrap();
        let metrics = agent.metrics();
        assert_eq!(metrics.total_steps, 1);
        assert_eq!(metrics.total_updates, 1);
        assert_eq!(metrics.states_discovered, 2);
        assert_eq!(metrics.epsilon, Some(agent.epsilon()));
    }
}
