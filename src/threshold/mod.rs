//! One-dimensional threshold classifier ("is this banana tasty?")
//!
//! Tasty bananas are assumed to sit inside a single ripeness interval. The
//! learner tries every pair of cut points on a fixed grid and keeps the window
//! that misclassifies the fewest labeled bananas.
//!
//! ```
//! use learnlab::threshold::{classify, find_thresholds};
//!
//! let fit = find_thresholds(&[2.0, 3.0, 4.0, 5.0], &[8.0, 9.0])?;
//! assert_eq!(fit.error, 0);
//! assert!(classify(3.5, fit.thresholds));
//! assert!(!classify(8.5, fit.thresholds));
//! # Ok::<(), learnlab::Error>(())
//! ```

pub mod dataset;
pub mod search;

pub use dataset::{BananaBatch, generate_bananas};
pub use search::{
    ClassificationReport, ThresholdConfig, ThresholdFit, ThresholdPair, TrainingSet,
    classification_error, classify, find_thresholds, find_thresholds_with,
};
