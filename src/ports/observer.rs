//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing Q-learning runs, allowing
//! composable progress display, metrics and trace export without coupling
//! the training loop to any output format.

use crate::{
    Result,
    q_learning::{EpisodeSummary, TrainingSummary},
};

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during training.
/// Examples include:
/// - Progress bars for user feedback
/// - JSONL export for analysis
/// - Metrics tracking for evaluation
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. `on_episode_end(summary)` - After every episode, followed by a
///    `should_stop()` poll
/// 3. `on_training_end(summary)` - Once at the end, also after a cancelled run
///
/// # Examples
///
/// ```no_run
/// use learnlab::{ports::Observer, q_learning::EpisodeSummary};
///
/// struct CountingObserver {
///     episodes: usize,
/// }
///
/// impl Observer for CountingObserver {
///     fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> learnlab::Result<()> {
///         self.episodes += 1;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    ///
    /// # Parameters
    ///
    /// * `total_episodes` - Number of episodes the run is configured for
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called after each episode, once ε has been decayed.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called when training completes or is cancelled.
    fn on_training_end(&mut self, _summary: &TrainingSummary) -> Result<()> {
        Ok(())
    }

    /// Polled between episodes; returning `true` cancels the remaining episodes.
    fn should_stop(&self) -> bool {
        false
    }
}
