//! Training and evaluation loops
//!
//! The loop owns nothing global: the caller builds one agent and one
//! environment per run and threads them through [`train`] or [`evaluate`].

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mousetrap_core::{Agent, Environment, Learning, Result, Reward};

/// Training loop configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of episodes to run
    pub episodes: usize,
    /// Emit a progress line every N episodes (0 disables)
    pub log_interval: usize,
    /// Call [`Environment::render`] after every step
    pub render: bool,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 500,
            log_interval: 50,
            render: false,
        }
    }
}

/// Outcome of a single episode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeStats {
    /// Zero-based episode number
    pub episode: usize,
    /// Sum of rewards collected
    pub total_reward: f64,
    /// Steps taken
    pub steps: usize,
    /// Ended by a time limit rather than a terminal tile
    pub truncated: bool,
    /// Agent exploration rate when the episode ended
    pub epsilon: Option<f64>,
}

/// Aggregate over a run of episodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Per-episode results in order
    pub episodes: Vec<EpisodeStats>,
    /// Steps across all episodes
    pub total_steps: usize,
    /// Mean episode reward
    pub mean_reward: f64,
    /// Best episode reward
    pub best_reward: f64,
    /// Episodes that hit the time limit
    pub truncated_episodes: usize,
    /// Exploration rate after the run
    pub final_epsilon: Option<f64>,
    /// States with a value row after the run
    pub states_discovered: usize,
}

impl TrainingSummary {
    fn from_episodes<A: Agent>(episodes: Vec<EpisodeStats>, agent: &A) -> Self {
        let metrics = agent.metrics();
        let total_steps = episodes.iter().map(|e| e.steps).sum();
        let mean_reward = if episodes.is_empty() {
            0.0
        } else {
            episodes.iter().map(|e| e.total_reward).sum::<f64>() / episodes.len() as f64
        };
        let best_reward = episodes
            .iter()
            .map(|e| e.total_reward)
            .fold(f64::NEG_INFINITY, f64::max);
        let truncated_episodes = episodes.iter().filter(|e| e.truncated).count();

        Self {
            total_steps,
            mean_reward,
            best_reward: if episodes.is_empty() { 0.0 } else { best_reward },
            truncated_episodes,
            final_epsilon: metrics.epsilon,
            states_discovered: metrics.states_discovered,
            episodes,
        }
    }

    /// Mean reward over the last `window` episodes
    #[must_use]
    pub fn recent_mean_reward(&self, window: usize) -> f64 {
        window_mean(&self.episodes, window)
    }
}

fn window_mean(episodes: &[EpisodeStats], window: usize) -> f64 {
    let start = episodes.len().saturating_sub(window);
    let recent = &episodes[start..];
    if recent.is_empty() {
        0.0
    } else {
        recent.iter().map(|e| e.total_reward).sum::<f64>() / recent.len() as f64
    }
}

/// Run `config.episodes` learning episodes.
///
/// Every step: select an action, apply it to the environment, feed the
/// transition back to the agent. Episodes end when the environment reports
/// `done` or `truncated`, after which the environment is reset.
pub async fn train<A, E>(
    agent: &mut A,
    env: &mut E,
    config: &TrainingConfig,
) -> Result<TrainingSummary>
where
    A: Agent<State = E::State>,
    E: Environment,
{
    let mut episodes = Vec::with_capacity(config.episodes);

    for episode in 0..config.episodes {
        let stats = run_episode(agent, env, episode, true, config.render).await?;
        debug!(
            episode,
            reward = stats.total_reward,
            steps = stats.steps,
            truncated = stats.truncated,
            "episode finished"
        );
        episodes.push(stats);

        if config.log_interval > 0 && (episode + 1) % config.log_interval == 0 {
            let metrics = agent.metrics();
            info!(
                episode = episode + 1,
                mean_reward = window_mean(&episodes, config.log_interval),
                epsilon = metrics.epsilon,
                states = metrics.states_discovered,
                "training progress"
            );
        }
    }

    let summary = TrainingSummary::from_episodes(episodes, agent);
    info!(
        episodes = summary.episodes.len(),
        steps = summary.total_steps,
        mean_reward = summary.mean_reward,
        states = summary.states_discovered,
        "training finished"
    );
    Ok(summary)
}

/// Run `episodes` episodes without updating the agent.
///
/// Exploration decay is frozen for the duration and the agent's previous
/// training mode is restored afterwards, even on error.
pub async fn evaluate<A, E>(
    agent: &mut A,
    env: &mut E,
    episodes: usize,
) -> Result<TrainingSummary>
where
    A: Learning<State = E::State>,
    E: Environment,
{
    let was_training = agent.is_training();
    agent.set_training(false);

    let mut results = Vec::with_capacity(episodes);
    let mut outcome = Ok(());
    for episode in 0..episodes {
        match run_episode(agent, env, episode, false, false).await {
            Ok(stats) => results.push(stats),
            Err(err) => {
                outcome = Err(err);
                break;
            }
        }
    }

    agent.set_training(was_training);
    outcome?;

    let summary = TrainingSummary::from_episodes(results, agent);
    info!(
        episodes = summary.episodes.len(),
        mean_reward = summary.mean_reward,
        truncated = summary.truncated_episodes,
        "evaluation finished"
    );
    Ok(summary)
}

async fn run_episode<A, E>(
    agent: &mut A,
    env: &mut E,
    episode: usize,
    learn: bool,
    render: bool,
) -> Result<EpisodeStats>
where
    A: Agent<State = E::State>,
    E: Environment,
{
    let (mut state, _info) = env.reset().await?;
    let mut total_reward = Reward::default();
    let mut steps = 0;

    loop {
        let action = agent.act(&state);
        let step = env.step(action).await?;
        if learn {
            agent.observe(&state, action, step.reward, &step.state)?;
        }
        if render {
            env.render().await?;
        }

        total_reward += step.reward;
        steps += 1;
        let terminal = step.terminal();
        state = step.state;

        if terminal.is_terminal() {
            return Ok(EpisodeStats {
                episode,
                total_reward: total_reward.value(),
                steps,
                truncated: step.truncated,
                epsilon: agent.metrics().epsilon,
            });
        }
    }
}
