//! Three small learning algorithms behind interactive-style demos
//!
//! This crate provides:
//! - A one-dimensional threshold classifier that learns a "tasty" ripeness window
//! - K-means clustering with per-iteration state for step-by-step display
//! - Tabular Q-learning on a grid world with goal and hazard cells
//! - Training observers, CSV export and a `learnlab` command-line front end

pub mod cli;
pub mod error;
pub mod export;
pub mod kmeans;
pub mod pipeline;
pub mod ports;
pub mod q_learning;
pub mod threshold;
pub mod types;

pub use error::{Error, Result};
pub use types::{LabeledSample, Point2D};
