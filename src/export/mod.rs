//! Export functionality for analysis
//!
//! CSV traces of k-means runs and Q-value heatmaps, for plotting outside the
//! CLI.

mod csv_export;

pub use csv_export::{KMeansTraceRecord, ValueRecord, write_kmeans_trace, write_value_snapshot};
