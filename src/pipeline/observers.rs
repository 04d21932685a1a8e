//! Observer pattern for training pipelines
//!
//! Observers allow composable data collection during training without coupling
//! training logic to specific output formats.

use std::{
    collections::VecDeque,
    fs::File,
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};

use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::Observer,
    q_learning::{EpisodeOutcome, EpisodeSummary, TrainingSummary},
};

/// Progress bar observer - Shows training progress
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    goals: usize,
    hazards: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            goals: 0,
            hazards: 0,
        }
    }

    fn message(&self) -> String {
        format!("{} F:{}", self.goals, self.hazards)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        let pb = ProgressBar::new(total_episodes as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} episodes (Z:{msg})")
                .map_err(|e| crate::Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?
                .progress_chars("=>-"),
        );
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        match summary.outcome {
            EpisodeOutcome::Goal => self.goals += 1,
            EpisodeOutcome::Hazard => self.hazards += 1,
            EpisodeOutcome::Truncated => {}
        }

        if let Some(pb) = &self.progress_bar {
            pb.set_position(summary.episode as u64 + 1);
            pb.set_message(self.message());
        }
        Ok(())
    }

    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.message());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks training metrics
pub struct MetricsObserver {
    goals: usize,
    hazards: usize,
    truncated: usize,
    episode_lengths: Vec<usize>,
    total_reward: f64,
    window: usize,
    recent_goals: VecDeque<bool>,
}

impl MetricsObserver {
    pub const DEFAULT_WINDOW: usize = 100;

    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::with_window(Self::DEFAULT_WINDOW)
    }

    /// Track the goal rate over the last `window` episodes
    pub fn with_window(window: usize) -> Self {
        Self {
            goals: 0,
            hazards: 0,
            truncated: 0,
            episode_lengths: Vec::new(),
            total_reward: 0.0,
            window: window.max(1),
            recent_goals: VecDeque::new(),
        }
    }

    pub fn episodes(&self) -> usize {
        self.episode_lengths.len()
    }

    /// Fraction of all episodes that reached the goal
    pub fn goal_rate(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.goals as f64 / self.episode_lengths.len() as f64
        }
    }

    /// Goal rate over the most recent episodes
    pub fn recent_goal_rate(&self) -> f64 {
        if self.recent_goals.is_empty() {
            0.0
        } else {
            self.recent_goals.iter().filter(|&&goal| goal).count() as f64
                / self.recent_goals.len() as f64
        }
    }

    /// Get average episode length
    pub fn avg_episode_length(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.episode_lengths.iter().sum::<usize>() as f64 / self.episode_lengths.len() as f64
        }
    }

    pub fn avg_reward(&self) -> f64 {
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            self.total_reward / self.episode_lengths.len() as f64
        }
    }

    /// Get metrics summary
    pub fn summary(&self) -> MetricsSummary {
        MetricsSummary {
            episodes: self.episodes(),
            goals: self.goals,
            hazards: self.hazards,
            truncated: self.truncated,
            goal_rate: self.goal_rate(),
            recent_goal_rate: self.recent_goal_rate(),
            avg_episode_length: self.avg_episode_length(),
            avg_reward: self.avg_reward(),
        }
    }
}

/// Summary of training metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub episodes: usize,
    pub goals: usize,
    pub hazards: usize,
    pub truncated: usize,
    pub goal_rate: f64,
    pub recent_goal_rate: f64,
    pub avg_episode_length: f64,
    pub avg_reward: f64,
}

impl Default for MetricsObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for MetricsObserver {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        *self = Self::with_window(self.window);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        let reached_goal = summary.outcome == EpisodeOutcome::Goal;
        match summary.outcome {
            EpisodeOutcome::Goal => self.goals += 1,
            EpisodeOutcome::Hazard => self.hazards += 1,
            EpisodeOutcome::Truncated => self.truncated += 1,
        }
        self.episode_lengths.push(summary.steps);
        self.total_reward += summary.total_reward;

        self.recent_goals.push_back(reached_goal);
        if self.recent_goals.len() > self.window {
            self.recent_goals.pop_front();
        }
        Ok(())
    }
}

/// Metrics observer that can still be read after the pipeline takes ownership
#[derive(Clone, Default)]
pub struct SharedMetricsObserver {
    inner: Arc<Mutex<MetricsObserver>>,
}

impl SharedMetricsObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock(&self) -> MutexGuard<'_, MetricsObserver> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn summary(&self) -> MetricsSummary {
        self.lock().summary()
    }
}

impl Observer for SharedMetricsObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        self.lock().on_training_start(total_episodes)
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.lock().on_episode_end(summary)
    }
}

/// One line of the JSONL episode trace
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub steps: usize,
    pub total_reward: f64,
    pub outcome: EpisodeOutcome,
    pub epsilon: f64,
}

impl From<&EpisodeSummary> for EpisodeRecord {
    fn from(summary: &EpisodeSummary) -> Self {
        Self {
            episode: summary.episode,
            steps: summary.steps,
            total_reward: summary.total_reward,
            outcome: summary.outcome,
            epsilon: summary.epsilon,
        }
    }
}

/// JSONL observer - Exports one JSON object per episode
pub struct JsonlObserver {
    writer: BufWriter<File>,
}

impl JsonlObserver {
    /// Create a new JSONL observer
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer })
    }
}

impl Observer for JsonlObserver {
    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        serde_json::to_writer(&mut self.writer, &EpisodeRecord::from(summary))?;
        writeln!(&mut self.writer)?;
        Ok(())
    }

    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Cancels training cooperatively between episodes
pub struct EarlyStopObserver {
    max_episodes: Option<usize>,
    goal_streak: Option<usize>,
    seen: usize,
    streak: usize,
}

impl EarlyStopObserver {
    /// Stop once `episodes` episodes have completed
    pub fn after_episodes(episodes: usize) -> Self {
        Self {
            max_episodes: Some(episodes),
            goal_streak: None,
            seen: 0,
            streak: 0,
        }
    }

    /// Stop once `streak` consecutive episodes reached the goal
    pub fn on_goal_streak(streak: usize) -> Self {
        Self {
            max_episodes: None,
            goal_streak: Some(streak),
            seen: 0,
            streak: 0,
        }
    }
}

impl Observer for EarlyStopObserver {
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        self.seen = 0;
        self.streak = 0;
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.seen += 1;
        if summary.outcome == EpisodeOutcome::Goal {
            self.streak += 1;
        } else {
            self.streak = 0;
        }
        Ok(())
    }

    fn should_stop(&self) -> bool {
        self.max_episodes.is_some_and(|max| self.seen >= max)
            || self.goal_streak.is_some_and(|streak| self.streak >= streak)
    }
}
