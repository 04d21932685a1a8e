//! Training pipeline for grid-world agents

use tracing::info;

use crate::{
    Result,
    ports::Observer,
    q_learning::{QLearningAgent, TrainingSummary},
};

/// Runs an agent's training episodes while notifying observers
#[derive(Default)]
pub struct TrainingPipeline {
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    /// Create a new training pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Reset the agent and run its configured number of episodes.
    ///
    /// Episodes run strictly in sequence against the one Q-table. Observers
    /// are polled between episodes and may cancel the rest of the run.
    pub fn run(&mut self, agent: &mut QLearningAgent) -> Result<TrainingSummary> {
        let total = agent.config().episodes;
        agent.reset();

        for observer in &mut self.observers {
            observer.on_training_start(total)?;
        }

        let mut summary = TrainingSummary {
            final_epsilon: agent.epsilon(),
            ..TrainingSummary::default()
        };

        for _ in 0..total {
            let episode = agent.run_episode();
            summary.record(&episode);

            for observer in &mut self.observers {
                observer.on_episode_end(&episode)?;
            }

            if self.observers.iter().any(|observer| observer.should_stop()) {
                summary.stopped_early = true;
                break;
            }
        }

        for observer in &mut self.observers {
            observer.on_training_end(&summary)?;
        }

        info!(
            episodes = summary.episodes,
            goal_rate = summary.goal_rate(),
            mean_length = summary.mean_episode_length(),
            final_epsilon = summary.final_epsilon,
            stopped_early = summary.stopped_early,
            "training finished"
        );

        Ok(summary)
    }

    /// Remove the observers, e.g. to read collected metrics after a run.
    pub fn into_observers(self) -> Vec<Box<dyn Observer>> {
        self.observers
    }
}
