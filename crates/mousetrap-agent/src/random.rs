//! Random agent for baseline comparisons

use std::marker::PhantomData;

use rand::{rngs::StdRng, Rng, SeedableRng};

use mousetrap_core::{Agent, AgentMetrics, DiscreteAction, DiscreteSpace, StateKey};

/// Random agent that selects actions uniformly at random and never learns
#[derive(Debug, Clone)]
pub struct RandomAgent<S, R = StdRng> {
    /// Action space
    action_space: DiscreteSpace,
    /// Action source
    rng: R,
    /// Actions selected so far
    steps: usize,
    _state: PhantomData<fn() -> S>,
}

impl<S: StateKey> RandomAgent<S, StdRng> {
    /// Create a new random agent, optionally seeded
    #[must_use]
    pub fn new(action_space: DiscreteSpace, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(action_space, rng)
    }
}

impl<S: StateKey, R: Rng> RandomAgent<S, R> {
    /// Create a random agent driven by an injected generator
    pub fn with_rng(action_space: DiscreteSpace, rng: R) -> Self {
        Self {
            action_space,
            rng,
            steps: 0,
            _state: PhantomData,
        }
    }
}

impl<S: StateKey, R: Rng> Agent for RandomAgent<S, R> {
    type State = S;

    fn act(&mut self, _state: &S) -> DiscreteAction {
        self.steps += 1;
        self.action_space.sample(&mut self.rng)
    }

    fn metrics(&self) -> AgentMetrics {
        AgentMetrics {
            total_steps: self.steps,
            ..AgentMetrics::default()
        }
    }
}
