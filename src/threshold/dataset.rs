//! Random banana batches for the threshold classifier

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::search::{ThresholdPair, TrainingSet};
use crate::types::Point2D;

/// Display marker for training bananas
pub const TRAINING_MARKER: f64 = 1.0;
/// Display marker for unseen test bananas
pub const TEST_MARKER: f64 = 0.5;

/// Ripeness scale upper bound (exclusive)
pub const RIPENESS_MAX: f64 = 10.0;

/// Bananas to label and bananas to classify afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BananaBatch {
    pub training: Vec<Point2D>,
    pub test: Vec<Point2D>,
}

impl BananaBatch {
    pub const DEFAULT_TRAINING: usize = 15;
    pub const DEFAULT_TEST: usize = 5;

    pub fn generate<R: Rng + ?Sized>(training: usize, test: usize, rng: &mut R) -> Self {
        Self {
            training: generate_bananas(training, TRAINING_MARKER, rng),
            test: generate_bananas(test, TEST_MARKER, rng),
        }
    }

    /// Label every training banana as tasty iff it falls inside `truth`.
    pub fn label_with(&self, truth: ThresholdPair) -> TrainingSet {
        let mut set = TrainingSet::new();
        for &point in &self.training {
            set.label(point, truth.contains(point.x));
        }
        set
    }
}

/// `count` bananas with ripeness uniform in [0, 10).
pub fn generate_bananas<R: Rng + ?Sized>(count: usize, marker: f64, rng: &mut R) -> Vec<Point2D> {
    (0..count)
        .map(|_| Point2D::new(rng.random_range(0.0..RIPENESS_MAX), marker))
        .collect()
}
