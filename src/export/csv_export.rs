//! CSV writers for k-means iteration traces and value snapshots
//!
//! One row per point or centroid per iteration, and one row per grid cell.

use std::path::Path;

use serde::Serialize;

use crate::{
    Point2D, Result,
    kmeans::KMeansStep,
    q_learning::{Shade, ValueSnapshot},
};

/// One row of a k-means trace: a point's assignment or a centroid position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KMeansTraceRecord {
    pub iteration: usize,
    /// `point` or `centroid`
    pub role: &'static str,
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub cluster: usize,
}

/// One heatmap cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueRecord {
    pub row: usize,
    pub col: usize,
    pub kind: &'static str,
    pub value: f64,
    pub shade: Shade,
    pub opacity: f64,
}

/// Write every iteration of a k-means run to `path`.
///
/// Each step contributes one row per point followed by one row per centroid.
/// Returns the number of data rows written.
pub fn write_kmeans_trace<P: AsRef<Path>>(
    path: P,
    points: &[Point2D],
    steps: &[KMeansStep],
) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    let mut rows = 0;

    for step in steps {
        for (index, (point, &cluster)) in points.iter().zip(&step.assignment).enumerate() {
            writer.serialize(KMeansTraceRecord {
                iteration: step.iteration,
                role: "point",
                index,
                x: point.x,
                y: point.y,
                cluster,
            })?;
            rows += 1;
        }
        for (cluster, centroid) in step.centroids.iter().enumerate() {
            writer.serialize(KMeansTraceRecord {
                iteration: step.iteration,
                role: "centroid",
                index: cluster,
                x: centroid.x,
                y: centroid.y,
                cluster,
            })?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

/// Write a shaded value snapshot to `path`, one row per cell in row-major order.
pub fn write_value_snapshot<P: AsRef<Path>>(path: P, snapshot: &ValueSnapshot) -> Result<usize> {
    let mut writer = csv::Writer::from_path(path)?;
    let heatmap = snapshot.heatmap();

    for heat in &heatmap {
        writer.serialize(ValueRecord {
            row: heat.cell.row,
            col: heat.cell.col,
            kind: heat.kind.name(),
            value: heat.value,
            shade: heat.shade,
            opacity: heat.opacity,
        })?;
    }

    writer.flush()?;
    Ok(heatmap.len())
}
