//! Tabular Q-learning on a small grid world ("robo-finder")
//!
//! The agent starts in a fixed cell and learns, by trial and error, to reach
//! the goal while avoiding hazard cells. Every move costs a small step reward;
//! entering the goal or a hazard ends the episode with that cell's reward.
//!
//! ## Usage Example
//!
//! ```no_run
//! use learnlab::q_learning::{GridWorld, QLearningAgent, QLearningConfig, Rewards};
//!
//! let mut agent = QLearningAgent::new(
//!     GridWorld::default(),
//!     Rewards::new(-1.0, -100.0, 100.0),
//!     QLearningConfig::default().with_seed(42),
//! )?;
//! agent.train()?;
//!
//! let path = agent.greedy_path(25);
//! assert!(path.reaches_goal());
//! # Ok::<(), learnlab::Error>(())
//! ```

pub mod agent;
pub mod grid;
pub mod q_table;
pub mod serialization;
pub mod snapshot;

// Public re-exports
pub use agent::{
    DEFAULT_PATH_STEPS, EpisodeOutcome, EpisodeSummary, QLearningAgent, QLearningConfig,
    TrainingSummary, Transition,
};
pub use grid::{Action, Cell, CellKind, DEFAULT_LAYOUT, GridWorld, NUM_ACTIONS, Rewards};
pub use q_table::QTable;
pub use serialization::SavedAgent;
pub use snapshot::{GreedyPath, HeatCell, PathOutcome, Shade, ValueSnapshot};

use crate::error::{Error, Result};

fn ensure_shape(grid: &GridWorld, q_table: &QTable) -> Result<()> {
    if q_table.num_states() == grid.num_states() {
        Ok(())
    } else {
        Err(Error::QTableShapeMismatch {
            expected: grid.num_states(),
            got: q_table.num_states(),
        })
    }
}

/// Train a fresh agent with default hyperparameters and return its Q-table.
pub fn train_agent(
    grid: &GridWorld,
    rewards: Rewards,
    episodes: usize,
    seed: Option<u64>,
) -> Result<QTable> {
    let config = QLearningConfig {
        episodes,
        seed,
        ..QLearningConfig::default()
    };
    let mut agent = QLearningAgent::new(grid.clone(), rewards, config)?;
    agent.train()?;
    Ok(agent.q_table().clone())
}

/// Follow the greedy policy of `q_table` from the grid's start cell.
pub fn greedy_path(grid: &GridWorld, q_table: &QTable, max_steps: usize) -> Result<GreedyPath> {
    ensure_shape(grid, q_table)?;
    Ok(GreedyPath::follow(grid, q_table, max_steps))
}

/// Per-cell values of `q_table` for display.
pub fn value_snapshot(
    grid: &GridWorld,
    q_table: &QTable,
    rewards: &Rewards,
) -> Result<ValueSnapshot> {
    ensure_shape(grid, q_table)?;
    Ok(ValueSnapshot::capture(grid, q_table, rewards))
}
