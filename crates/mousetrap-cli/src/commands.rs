// Command implementations for the mousetrap CLI

use anyhow::{Context, Result};
use tracing::info;

use mousetrap_agent::{evaluate, train, QLearningAgent, RandomAgent, TrainingSummary};
use mousetrap_core::{DiscreteAction, Environment, TileIndex};
use mousetrap_env::{GridWorld, TimeLimit};

use crate::config::RunConfig;

fn build_env(config: &RunConfig) -> Result<TimeLimit<GridWorld>> {
    let world = GridWorld::new(config.grid.clone()).context("Invalid grid layout")?;
    Ok(TimeLimit::new(world, config.limits.max_steps))
}

fn build_agent(config: &RunConfig) -> Result<QLearningAgent<TileIndex>> {
    QLearningAgent::new(config.agent.clone()).context("Invalid agent configuration")
}

pub async fn train_command(config: RunConfig, show_policy: bool) -> Result<()> {
    let mut env = build_env(&config)?;
    let mut agent = build_agent(&config)?;
    info!(
        episodes = config.training.episodes,
        learning_rate = config.agent.learning_rate,
        discount_factor = config.agent.discount_factor,
        seed = ?config.agent.seed,
        "starting training"
    );

    let summary = train(&mut agent, &mut env, &config.training).await?;
    print_summary("Training", &summary);

    if show_policy {
        println!("\nGreedy policy:");
        print!("{}", policy_map(&env.env, &agent));
    }

    env.close().await?;
    Ok(())
}

pub async fn evaluate_command(config: RunConfig) -> Result<()> {
    let mut env = build_env(&config)?;
    let mut agent = build_agent(&config)?;

    let trained = train(&mut agent, &mut env, &config.training).await?;
    print_summary("Training", &trained);

    let evaluated = evaluate(&mut agent, &mut env, config.limits.eval_episodes).await?;
    print_summary("Evaluation", &evaluated);

    env.close().await?;
    Ok(())
}

pub async fn baseline_command(config: RunConfig) -> Result<()> {
    let mut env = build_env(&config)?;
    let mut agent = RandomAgent::new(env.action_space(), config.agent.seed);

    let summary = train(&mut agent, &mut env, &config.training).await?;
    print_summary("Random baseline", &summary);

    env.close().await?;
    Ok(())
}

pub fn show_grid(config: &RunConfig) -> Result<()> {
    let world = GridWorld::new(config.grid.clone()).context("Invalid grid layout")?;
    println!(
        "{} x {} grid, start tile {}",
        config.grid.width, config.grid.height, config.grid.start
    );
    print!("{world}");
    println!("\nM mouse   c cheese   X trap   C big cheese");
    Ok(())
}

fn policy_map(world: &GridWorld, agent: &QLearningAgent<TileIndex>) -> String {
    world.policy_map(|tile| agent.table().greedy_action(&tile).map(DiscreteAction))
}

fn print_summary(label: &str, summary: &TrainingSummary) {
    println!("\n{label} summary");
    println!("  Episodes:          {}", summary.episodes.len());
    println!("  Total steps:       {}", summary.total_steps);
    println!("  Mean reward:       {:.2}", summary.mean_reward);
    println!("  Last-50 mean:      {:.2}", summary.recent_mean_reward(50));
    println!("  Best reward:       {:.2}", summary.best_reward);
    println!("  Time-limited:      {}", summary.truncated_episodes);
    if let Some(epsilon) = summary.final_epsilon {
        println!("  Final epsilon:     {epsilon:.4}");
    }
    println!("  States discovered: {}", summary.states_discovered);
}
