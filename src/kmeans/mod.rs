//! K-means clustering for the "music discovery" demo
//!
//! A run seeds `k` centroids from the data, then alternates assignment and
//! update passes. [`KMeansRun`] yields the state after every pass so callers
//! can show the clusters forming one iteration at a time.

pub mod clusterer;
pub mod dataset;

pub use clusterer::{
    KMeans, KMeansConfig, KMeansResult, KMeansRun, KMeansStep, assign_points, inertia,
    init_centroids, run_kmeans_iteration, update_centroids,
};
pub use dataset::generate_spread_songs;
