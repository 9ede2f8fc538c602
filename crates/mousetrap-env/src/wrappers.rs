//! Environment wrappers

use async_trait::async_trait;

use mousetrap_core::{DiscreteAction, DiscreteSpace, Environment, Episode, Step, StepInfo};

/// Time limit wrapper.
///
/// Marks the step that reaches `max_steps` as truncated unless the inner
/// environment already ended the episode on that step.
pub struct TimeLimit<E> {
    /// Inner environment
    pub env: E,
    /// Maximum steps
    pub max_steps: usize,
    /// Current step count
    pub steps: usize,
}

impl<E> TimeLimit<E> {
    /// Create a new time limit wrapper
    pub fn new(env: E, max_steps: usize) -> Self {
        Self {
            env,
            max_steps,
            steps: 0,
        }
    }

    /// Unwrap the inner environment
    pub fn into_inner(self) -> E {
        self.env
    }
}

#[async_trait]
impl<E> Environment for TimeLimit<E>
where
    E: Environment,
{
    type State = E::State;

    fn action_space(&self) -> DiscreteSpace {
        self.env.action_space()
    }

    async fn reset(&mut self) -> mousetrap_core::Result<(Self::State, StepInfo)> {
        self.steps = 0;
        self.env.reset().await
    }

    async fn step(&mut self, action: DiscreteAction) -> mousetrap_core::Result<Step<Self::State>> {
        let mut step = self.env.step(action).await?;
        self.steps += 1;

        if self.steps >= self.max_steps && !step.done {
            step.truncated = true;
        }

        Ok(step)
    }

    async fn render(&self) -> mousetrap_core::Result<()> {
        self.env.render().await
    }

    async fn close(&mut self) -> mousetrap_core::Result<()> {
        self.env.close().await
    }

    fn episode_info(&self) -> Option<Episode> {
        self.env.episode_info()
    }
}
