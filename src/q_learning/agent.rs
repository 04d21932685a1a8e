//! Q-learning agent for the grid world
//!
//! The agent owns its grid, rewards, Q-table and random source. Training
//! replays episodes from the start cell until a goal or hazard is entered,
//! updating the Q-table after every step.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::{Error, Result},
    pipeline::TrainingPipeline,
    q_learning::{
        grid::{Action, Cell, CellKind, GridWorld, NUM_ACTIONS, Rewards},
        q_table::QTable,
        snapshot::{GreedyPath, ValueSnapshot},
    },
};

/// Default cap on the number of moves when following the greedy policy
pub const DEFAULT_PATH_STEPS: usize = 25;

fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Hyperparameters for a training run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QLearningConfig {
    /// α parameter (0.0 to 1.0]
    pub learning_rate: f64,
    /// γ parameter [0.0 to 1.0]
    pub discount_factor: f64,
    /// Number of episodes per training run
    pub episodes: usize,
    /// Exploration rate at the start of training
    pub initial_epsilon: f64,
    /// Multiplicative decay applied after each episode
    pub epsilon_decay: f64,
    /// Floor for the exploration rate
    pub min_epsilon: f64,
    /// Optional safety cap on moves per episode
    pub max_episode_steps: Option<usize>,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.1,
            discount_factor: 0.9,
            episodes: 5000,
            initial_epsilon: 1.0,
            epsilon_decay: 0.999,
            min_epsilon: 0.01,
            max_episode_steps: None,
            seed: None,
        }
    }
}

impl QLearningConfig {
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_discount_factor(mut self, discount_factor: f64) -> Self {
        self.discount_factor = discount_factor;
        self
    }

    pub fn with_max_episode_steps(mut self, max_steps: usize) -> Self {
        self.max_episode_steps = Some(max_steps);
        self
    }

    pub fn validate(&self) -> Result<()> {
        fn check(name: &str, value: f64, ok: bool, expected: &str) -> Result<()> {
            if ok && value.is_finite() {
                Ok(())
            } else {
                Err(Error::InvalidHyperparameter {
                    name: name.to_string(),
                    value,
                    expected: expected.to_string(),
                })
            }
        }

        let lr = self.learning_rate;
        check("learning_rate", lr, lr > 0.0 && lr <= 1.0, "0 < α <= 1")?;
        let gamma = self.discount_factor;
        check("discount_factor", gamma, (0.0..=1.0).contains(&gamma), "0 <= γ <= 1")?;
        let eps = self.initial_epsilon;
        check("initial_epsilon", eps, eps > 0.0 && eps <= 1.0, "0 < ε <= 1")?;
        let decay = self.epsilon_decay;
        check("epsilon_decay", decay, decay > 0.0 && decay <= 1.0, "0 < decay <= 1")?;
        // A positive floor keeps exploring, so uncapped episodes still terminate.
        let floor = self.min_epsilon;
        check(
            "min_epsilon",
            floor,
            floor > 0.0 && floor <= eps,
            "0 < ε_min <= initial ε",
        )?;
        if self.max_episode_steps == Some(0) {
            return Err(Error::InvalidConfiguration {
                message: "max_episode_steps must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// One environment transition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: Cell,
    pub action: Action,
    pub to: Cell,
    pub reward: f64,
    pub done: bool,
}

/// How an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodeOutcome {
    Goal,
    Hazard,
    /// Stopped by `max_episode_steps`
    Truncated,
}

/// Per-episode statistics handed to observers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// 0-based episode index within the training run
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    pub outcome: EpisodeOutcome,
    /// Exploration rate after this episode's decay
    pub epsilon: f64,
}

/// Aggregate statistics for a training run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    pub episodes: usize,
    pub goal_episodes: usize,
    pub hazard_episodes: usize,
    pub truncated_episodes: usize,
    pub total_steps: usize,
    pub final_epsilon: f64,
    /// Set when an observer requested cancellation
    pub stopped_early: bool,
}

impl TrainingSummary {
    pub fn record(&mut self, episode: &EpisodeSummary) {
        self.episodes += 1;
        self.total_steps += episode.steps;
        self.final_epsilon = episode.epsilon;
        match episode.outcome {
            EpisodeOutcome::Goal => self.goal_episodes += 1,
            EpisodeOutcome::Hazard => self.hazard_episodes += 1,
            EpisodeOutcome::Truncated => self.truncated_episodes += 1,
        }
    }

    pub fn goal_rate(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.goal_episodes as f64 / self.episodes as f64
        }
    }

    pub fn mean_episode_length(&self) -> f64 {
        if self.episodes == 0 {
            0.0
        } else {
            self.total_steps as f64 / self.episodes as f64
        }
    }
}

/// Tabular Q-learning agent with ε-greedy exploration
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    grid: GridWorld,
    rewards: Rewards,
    config: QLearningConfig,
    q_table: QTable,
    epsilon: f64,
    rng: StdRng,
    episodes_trained: usize,
}

impl QLearningAgent {
    /// Create an untrained agent. The Q-table starts at zero.
    pub fn new(grid: GridWorld, rewards: Rewards, config: QLearningConfig) -> Result<Self> {
        config.validate()?;
        rewards.validate()?;
        Ok(Self {
            q_table: QTable::new(
                grid.num_states(),
                config.learning_rate,
                config.discount_factor,
            ),
            epsilon: config.initial_epsilon,
            rng: build_rng(config.seed),
            grid,
            rewards,
            config,
            episodes_trained: 0,
        })
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub(crate) fn from_parts(
        grid: GridWorld,
        rewards: Rewards,
        config: QLearningConfig,
        q_table: QTable,
        epsilon: f64,
        episodes_trained: usize,
    ) -> Result<Self> {
        grid.validate()?;
        if q_table.num_states() != grid.num_states() {
            return Err(Error::QTableShapeMismatch {
                expected: grid.num_states(),
                got: q_table.num_states(),
            });
        }
        let mut agent = Self::new(grid, rewards, config)?;
        agent.q_table = q_table;
        agent.epsilon = epsilon;
        agent.episodes_trained = episodes_trained;
        Ok(agent)
    }

    pub fn grid(&self) -> &GridWorld {
        &self.grid
    }

    pub fn rewards(&self) -> &Rewards {
        &self.rewards
    }

    pub fn config(&self) -> &QLearningConfig {
        &self.config
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Episodes completed since the last reset
    pub fn episodes_trained(&self) -> usize {
        self.episodes_trained
    }

    /// Discard everything learned: zero Q-table, initial ε, fresh random source.
    pub fn reset(&mut self) {
        self.q_table = QTable::new(
            self.grid.num_states(),
            self.config.learning_rate,
            self.config.discount_factor,
        );
        self.epsilon = self.config.initial_epsilon;
        self.rng = build_rng(self.config.seed);
        self.episodes_trained = 0;
    }

    /// Reset and run the configured number of episodes.
    pub fn train(&mut self) -> Result<TrainingSummary> {
        TrainingPipeline::new().run(self)
    }

    fn state_of(&self, cell: Cell) -> usize {
        cell.row * self.grid.width() + cell.col
    }

    fn kind_of(&self, cell: Cell) -> CellKind {
        self.grid.kind(cell).unwrap_or(CellKind::Empty)
    }

    /// ε-greedy action selection
    fn select_action_epsilon_greedy(&mut self, state: usize) -> Action {
        if self.rng.random::<f64>() < self.epsilon {
            // Explore: random action
            Action::ALL[self.rng.random_range(0..NUM_ACTIONS)]
        } else {
            // Exploit: greedy action based on Q-values
            self.q_table.greedy_action(state)
        }
    }

    /// Apply `action` in `from` without touching the Q-table.
    pub fn transition(&self, from: Cell, action: Action) -> Transition {
        let to = self.grid.step(from, action);
        let (reward, done) = self.rewards.for_entering(self.kind_of(to));
        Transition {
            from,
            action,
            to,
            reward,
            done,
        }
    }

    /// Decay epsilon after episode
    fn decay_epsilon(&mut self) {
        self.epsilon = (self.epsilon * self.config.epsilon_decay).max(self.config.min_epsilon);
    }

    /// Run a single learning episode from the start cell.
    ///
    /// A start placed on a goal or hazard yields a one-step episode.
    pub fn run_episode(&mut self) -> EpisodeSummary {
        let start = self.grid.start();
        let start_kind = self.kind_of(start);

        let mut cell = start;
        let mut steps = 0;
        let mut total_reward = 0.0;
        let outcome = loop {
            let state = self.state_of(cell);
            let action = self.select_action_epsilon_greedy(state);
            let transition = self.transition(cell, action);
            let next_state = self.state_of(transition.to);
            let done = transition.done || start_kind.is_terminal();

            self.q_table
                .q_learning_update(state, action, transition.reward, next_state, done);

            steps += 1;
            total_reward += transition.reward;
            cell = transition.to;

            if done {
                break match self.kind_of(cell) {
                    CellKind::Hazard => EpisodeOutcome::Hazard,
                    CellKind::Goal => EpisodeOutcome::Goal,
                    _ if start_kind == CellKind::Hazard => EpisodeOutcome::Hazard,
                    _ => EpisodeOutcome::Goal,
                };
            }
            if self.config.max_episode_steps.is_some_and(|cap| steps >= cap) {
                warn!(
                    episode = self.episodes_trained,
                    steps, "episode truncated by step cap"
                );
                break EpisodeOutcome::Truncated;
            }
        };

        self.decay_epsilon();
        let summary = EpisodeSummary {
            episode: self.episodes_trained,
            steps,
            total_reward,
            outcome,
            epsilon: self.epsilon,
        };
        self.episodes_trained += 1;
        summary
    }

    /// Follow the greedy policy from the start for at most `max_steps` moves.
    pub fn greedy_path(&self, max_steps: usize) -> GreedyPath {
        GreedyPath::follow(&self.grid, &self.q_table, max_steps)
    }

    /// State values for display: rewards for terminal cells, max Q elsewhere.
    pub fn value_snapshot(&self) -> ValueSnapshot {
        ValueSnapshot::capture(&self.grid, &self.q_table, &self.rewards)
    }
}
