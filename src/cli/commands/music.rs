//! Music command - Cluster songs by energy and danceability

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::{
    Point2D,
    cli::{
        config::CommonConfig,
        output::{print_kv, print_section, print_subsection},
    },
    export::write_kmeans_trace,
    kmeans::{KMeans, KMeansConfig, KMeansResult, generate_spread_songs},
};

#[derive(Parser, Debug)]
#[command(about = "Cluster generated songs with k-means")]
pub struct MusicArgs {
    /// Number of clusters
    #[arg(long, short = 'k', default_value_t = 3)]
    pub k: usize,

    /// Maximum number of assignment/update passes
    #[arg(long, default_value_t = KMeansConfig::DEFAULT_MAX_ITERATIONS)]
    pub max_iterations: usize,

    /// Write the per-iteration trace as CSV
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonConfig,
}

/// Generate the songs and cluster them without printing.
pub fn run(args: &MusicArgs) -> Result<(Vec<Point2D>, KMeansResult)> {
    let mut rng = args.common.rng();
    let songs = generate_spread_songs(&mut rng);
    let config = KMeansConfig::new(args.k).with_max_iterations(args.max_iterations);
    let result = KMeans::new(config)
        .fit(&songs, &mut rng)
        .with_context(|| format!("Failed to cluster {} songs into {} groups", songs.len(), args.k))?;
    Ok((songs, result))
}

fn format_centroids(centroids: &[Point2D]) -> String {
    centroids
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn execute(args: MusicArgs) -> Result<()> {
    let (songs, result) = run(&args)?;

    print_section("Music Discovery (k-means)");
    print_kv("Songs", &songs.len().to_string());
    print_kv("Clusters", &args.k.to_string());
    print_kv("Initial centroids", &format_centroids(&result.initial_centroids));

    for step in &result.steps {
        print_subsection(&format!("Iteration {}", step.iteration));
        let mut sizes = vec![0usize; step.centroids.len()];
        for &cluster in &step.assignment {
            sizes[cluster] += 1;
        }
        print_kv("Centroids", &format_centroids(&step.centroids));
        print_kv("Cluster sizes", &format!("{sizes:?}"));
        print_kv("Assignment changed", &step.changed.to_string());
    }

    print_subsection("Result");
    print_kv("Converged", &result.converged.to_string());
    print_kv("Inertia", &format!("{:.2}", result.inertia));

    if let Some(path) = &args.export {
        let rows = write_kmeans_trace(path, &songs, &result.steps)
            .with_context(|| format!("Failed to export trace to {}", path.display()))?;
        println!("\n✓ Wrote {rows} rows to {}", path.display());
    }

    Ok(())
}
