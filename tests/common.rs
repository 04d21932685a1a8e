//! Common test utilities for the learnlab test suite.
#![allow(dead_code)]

use learnlab::q_learning::{GridWorld, QLearningAgent, QLearningConfig, Rewards};
use rand::{SeedableRng, rngs::StdRng};

/// 5x5 grid with no hazards, start top-left and goal bottom-right.
pub const OPEN_LAYOUT: &str = "S..../...../...../...../....Z";

/// Start with a hazard directly below it and a safe route to the right.
pub const CLIFF_LAYOUT: &str = "S.../F.../...Z";

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn grid(layout: &str) -> GridWorld {
    GridWorld::parse(layout).expect("test layout should parse")
}

/// Train a fresh agent on `layout` with default hyperparameters.
pub fn trained_agent(layout: &str, rewards: Rewards, episodes: usize, seed: u64) -> QLearningAgent {
    let config = QLearningConfig::default()
        .with_episodes(episodes)
        .with_seed(seed);
    let mut agent = QLearningAgent::new(grid(layout), rewards, config).expect("valid agent");
    agent.train().expect("training should succeed");
    agent
}
