//! Training pipeline abstractions
//!
//! This module provides:
//! - A pipeline that drives Q-learning episodes and notifies observers
//! - Observer adapters for progress bars, metrics and JSONL traces

pub mod observers;
pub mod training;

// Re-export observer implementations (adapters)
pub use observers::{
    EarlyStopObserver, EpisodeRecord, JsonlObserver, MetricsObserver, MetricsSummary,
    ProgressObserver, SharedMetricsObserver,
};
pub use training::TrainingPipeline;

pub use crate::ports::Observer;
