//! Robo commands - Train and inspect the grid-world Q-learning agent

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    cli::{
        config::CommonConfig,
        output::{
            format_heatmap, format_number, format_path, print_kv, print_section,
            print_stats_table, print_subsection,
        },
    },
    export::write_value_snapshot,
    pipeline::{
        EarlyStopObserver, JsonlObserver, MetricsSummary, ProgressObserver,
        SharedMetricsObserver, TrainingPipeline,
    },
    q_learning::{
        DEFAULT_LAYOUT, DEFAULT_PATH_STEPS, GridWorld, QLearningAgent, QLearningConfig, Rewards,
        SavedAgent, TrainingSummary,
    },
};

#[derive(Parser, Debug)]
#[command(about = "Train a Q-learning agent on a grid world", allow_negative_numbers = true)]
pub struct RoboArgs {
    /// Grid layout, rows separated by '/' (S start, . empty, F hazard, Z goal)
    #[arg(long, default_value = DEFAULT_LAYOUT)]
    pub layout: String,

    /// Reward for every ordinary move
    #[arg(long, default_value_t = -1.0)]
    pub step: f64,

    /// Reward for entering a hazard
    #[arg(long, default_value_t = -100.0)]
    pub hazard: f64,

    /// Reward for reaching the goal
    #[arg(long, default_value_t = 100.0)]
    pub goal: f64,

    /// Number of training episodes
    #[arg(long, short = 'e', default_value_t = 5000)]
    pub episodes: usize,

    /// Learning rate α (0.0-1.0]
    #[arg(long, default_value_t = 0.1)]
    pub learning_rate: f64,

    /// Discount factor γ (0.0-1.0)
    #[arg(long, default_value_t = 0.9)]
    pub discount: f64,

    /// Optional safety cap on moves per episode
    #[arg(long)]
    pub max_episode_steps: Option<usize>,

    /// Stop training after this many consecutive goal episodes
    #[arg(long)]
    pub stop_after_goal_streak: Option<usize>,

    /// Maximum moves when following the learned policy
    #[arg(long, default_value_t = DEFAULT_PATH_STEPS)]
    pub path_steps: usize,

    /// Output file for the trained agent (MessagePack)
    #[arg(long, short = 'O')]
    pub output: Option<PathBuf>,

    /// Optional file for JSONL episode observations
    #[arg(long)]
    pub observations: Option<PathBuf>,

    /// Write the value snapshot as CSV
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonConfig,
}

#[derive(Parser, Debug)]
#[command(about = "Show the heatmap and greedy path of a saved agent")]
pub struct RoboInspectArgs {
    /// Saved agent file
    pub file: PathBuf,

    /// Maximum moves when following the learned policy
    #[arg(long, default_value_t = DEFAULT_PATH_STEPS)]
    pub path_steps: usize,

    /// Verbose output (debug-level logging)
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

/// Trained agent plus what the observers collected.
pub struct RoboOutcome {
    pub agent: QLearningAgent,
    pub summary: TrainingSummary,
    pub metrics: MetricsSummary,
}

/// Train the agent and write any requested files, without printing.
pub fn run(args: &RoboArgs) -> Result<RoboOutcome> {
    let grid = GridWorld::parse(&args.layout)
        .with_context(|| format!("Invalid layout '{}'", args.layout))?;
    let rewards = Rewards::new(args.step, args.hazard, args.goal);
    let config = QLearningConfig {
        learning_rate: args.learning_rate,
        discount_factor: args.discount,
        episodes: args.episodes,
        max_episode_steps: args.max_episode_steps,
        seed: args.common.seed,
        ..QLearningConfig::default()
    };
    let mut agent = QLearningAgent::new(grid, rewards, config)?;

    let metrics = SharedMetricsObserver::new();
    let mut pipeline = TrainingPipeline::new().with_observer(Box::new(metrics.clone()));
    if args.common.progress {
        pipeline = pipeline.with_observer(Box::new(ProgressObserver::new()));
    }
    if let Some(path) = &args.observations {
        let observer = JsonlObserver::new(path)
            .with_context(|| format!("Failed to create observations file {}", path.display()))?;
        pipeline = pipeline.with_observer(Box::new(observer));
    }
    if let Some(streak) = args.stop_after_goal_streak {
        pipeline = pipeline.with_observer(Box::new(EarlyStopObserver::on_goal_streak(streak)));
    }

    let summary = pipeline.run(&mut agent)?;

    if let Some(path) = &args.export {
        write_value_snapshot(path, &agent.value_snapshot())
            .with_context(|| format!("Failed to export values to {}", path.display()))?;
    }
    if let Some(path) = &args.output {
        SavedAgent::from_agent(&agent, Some(summary.clone())).save_to_file(path)?;
    }

    Ok(RoboOutcome {
        agent,
        metrics: metrics.summary(),
        summary,
    })
}

fn print_training_summary(summary: &TrainingSummary) {
    print_subsection("Training");
    print_stats_table(&[
        ("Episodes", format_number(summary.episodes)),
        ("Reached goal", format_number(summary.goal_episodes)),
        ("Entered hazard", format_number(summary.hazard_episodes)),
        ("Truncated", format_number(summary.truncated_episodes)),
        ("Goal rate", format!("{:.1}%", summary.goal_rate() * 100.0)),
        ("Mean length", format!("{:.2}", summary.mean_episode_length())),
        ("Final ε", format!("{:.4}", summary.final_epsilon)),
    ]);
    if summary.stopped_early {
        println!("  (stopped early)");
    }
}

fn print_policy(agent: &QLearningAgent, path_steps: usize) {
    print_subsection("State values");
    print!("{}", format_heatmap(&agent.value_snapshot()));

    let path = agent.greedy_path(path_steps);
    print_subsection("Greedy path");
    print!("{}", format_path(agent.grid(), &path));
    print_kv("Moves", &path.len().to_string());
    print_kv("Outcome", &format!("{:?}", path.outcome));
}

pub fn execute(args: RoboArgs) -> Result<()> {
    let outcome = run(&args)?;

    print_section("Robo Finder (Q-learning)");
    print!("{}", outcome.agent.grid());
    print_training_summary(&outcome.summary);
    print_kv(
        "Recent goal rate",
        &format!("{:.1}%", outcome.metrics.recent_goal_rate * 100.0),
    );
    print_policy(&outcome.agent, args.path_steps);

    if let Some(path) = &args.observations {
        println!("\n✓ Observations written to {}", path.display());
    }
    if let Some(path) = &args.export {
        println!("✓ Values exported to {}", path.display());
    }
    if let Some(path) = &args.output {
        println!("✓ Agent saved to {}", path.display());
    }

    Ok(())
}

pub fn execute_inspect(args: RoboInspectArgs) -> Result<()> {
    let saved = SavedAgent::load_from_file(&args.file)?;
    let agent = saved.to_agent()?;

    print_section(&format!("Saved agent: {}", args.file.display()));
    print!("{}", agent.grid());
    print_kv(
        "Rewards",
        &format!(
            "step {} / hazard {} / goal {}",
            agent.rewards().step,
            agent.rewards().hazard,
            agent.rewards().goal
        ),
    );
    print_kv("Episodes trained", &format_number(agent.episodes_trained()));
    if let Some(summary) = &saved.summary {
        print_training_summary(summary);
    }
    print_policy(&agent, args.path_steps);

    Ok(())
}
