//! Lloyd-style k-means with a small iteration cap

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    error::{Error, Result},
    types::Point2D,
};

/// Parameters for a clustering run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KMeansConfig {
    /// Number of clusters
    pub k: usize,
    /// Upper bound on assign/update iterations
    pub max_iterations: usize,
}

impl KMeansConfig {
    pub const DEFAULT_MAX_ITERATIONS: usize = 4;

    pub fn new(k: usize) -> Self {
        Self {
            k,
            max_iterations: Self::DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Check the configuration against a concrete data set.
    pub fn validate(&self, points: &[Point2D]) -> Result<()> {
        validate_points("points", points)?;
        if self.k == 0 || self.k > points.len() {
            return Err(Error::InvalidClusterCount {
                k: self.k,
                points: points.len(),
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidConfiguration {
                message: "k-means needs at least one iteration".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self::new(3)
    }
}

fn validate_points(what: &str, points: &[Point2D]) -> Result<()> {
    if points.is_empty() {
        return Err(Error::EmptyInput {
            what: what.to_string(),
        });
    }
    if let Some(bad) = points.iter().find(|p| !p.is_finite()) {
        let value = if bad.x.is_finite() { bad.y } else { bad.x };
        return Err(Error::NonFiniteValue {
            what: what.to_string(),
            value,
        });
    }
    Ok(())
}

/// One cluster index per point, each below `k`.
fn validate_assignment(points: &[Point2D], assignment: &[usize], k: usize) -> Result<()> {
    if assignment.len() != points.len() {
        return Err(Error::LengthMismatch {
            what: "assignment".to_string(),
            expected: points.len(),
            got: assignment.len(),
        });
    }
    if let Some((index, &cluster)) = assignment.iter().enumerate().find(|(_, c)| **c >= k) {
        return Err(Error::InvalidAssignment { index, cluster, k });
    }
    Ok(())
}

/// Pick `k` initial centroids uniformly from `points`, with replacement.
pub fn init_centroids<R: Rng + ?Sized>(
    points: &[Point2D],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Point2D>> {
    KMeansConfig::new(k).validate(points)?;
    Ok((0..k).map(|_| random_point(points, rng)).collect())
}

fn random_point<R: Rng + ?Sized>(points: &[Point2D], rng: &mut R) -> Point2D {
    points[rng.random_range(0..points.len())]
}

/// Index of the nearest centroid for every point. Ties go to the lowest index.
pub fn assign_points(points: &[Point2D], centroids: &[Point2D]) -> Vec<usize> {
    points
        .iter()
        .map(|point| {
            let mut best = 0;
            let mut best_distance = f64::INFINITY;
            for (index, centroid) in centroids.iter().enumerate() {
                let distance = point.distance(centroid);
                if distance < best_distance {
                    best_distance = distance;
                    best = index;
                }
            }
            best
        })
        .collect()
}

/// Mean of each cluster's members. Empty clusters get a random input point.
pub fn update_centroids<R: Rng + ?Sized>(
    points: &[Point2D],
    assignment: &[usize],
    k: usize,
    rng: &mut R,
) -> Result<Vec<Point2D>> {
    validate_points("points", points)?;
    validate_assignment(points, assignment, k)?;
    Ok(cluster_means(points, assignment, k, rng))
}

/// Callers guarantee every entry of `assignment` is below `k`.
fn cluster_means<R: Rng + ?Sized>(
    points: &[Point2D],
    assignment: &[usize],
    k: usize,
    rng: &mut R,
) -> Vec<Point2D> {
    let mut sums = vec![(0.0, 0.0, 0usize); k];
    for (point, &cluster) in points.iter().zip(assignment) {
        let entry = &mut sums[cluster];
        entry.0 += point.x;
        entry.1 += point.y;
        entry.2 += 1;
    }

    sums.into_iter()
        .enumerate()
        .map(|(cluster, (sum_x, sum_y, count))| {
            if count > 0 {
                Point2D::new(sum_x / count as f64, sum_y / count as f64)
            } else {
                let seed = random_point(points, rng);
                warn!(cluster, %seed, "empty cluster re-seeded");
                seed
            }
        })
        .collect()
}

/// One assign + update pass.
pub fn run_kmeans_iteration<R: Rng + ?Sized>(
    points: &[Point2D],
    centroids: &[Point2D],
    rng: &mut R,
) -> Result<(Vec<usize>, Vec<Point2D>)> {
    validate_points("points", points)?;
    validate_points("centroids", centroids)?;
    let assignment = assign_points(points, centroids);
    let updated = cluster_means(points, &assignment, centroids.len(), rng);
    Ok((assignment, updated))
}

/// Sum of squared distances from each point to its centroid.
pub fn inertia(points: &[Point2D], assignment: &[usize], centroids: &[Point2D]) -> Result<f64> {
    validate_assignment(points, assignment, centroids.len())?;
    Ok(points
        .iter()
        .zip(assignment)
        .map(|(point, &cluster)| point.distance(&centroids[cluster]).powi(2))
        .sum())
}

/// State after one iteration: the assignment that was computed and the
/// centroids that were moved to match it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansStep {
    /// 1-based iteration number
    pub iteration: usize,
    pub assignment: Vec<usize>,
    pub centroids: Vec<Point2D>,
    /// Whether the assignment differs from the previous iteration
    pub changed: bool,
}

/// Clusterer bound to a configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct KMeans {
    config: KMeansConfig,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KMeansConfig {
        &self.config
    }

    /// Seed the centroids and return a generator of iteration states.
    pub fn run<'a, R: Rng + ?Sized>(
        &self,
        points: &'a [Point2D],
        rng: &'a mut R,
    ) -> Result<KMeansRun<'a, R>> {
        self.config.validate(points)?;
        let centroids = init_centroids(points, self.config.k, rng)?;
        Ok(KMeansRun {
            points,
            rng,
            initial_centroids: centroids.clone(),
            centroids,
            previous: vec![0; points.len()],
            iteration: 0,
            max_iterations: self.config.max_iterations,
            finished: false,
        })
    }

    /// Run to completion and keep every intermediate state.
    pub fn fit<R: Rng + ?Sized>(&self, points: &[Point2D], rng: &mut R) -> Result<KMeansResult> {
        let mut run = self.run(points, rng)?;
        let initial_centroids = run.initial_centroids().to_vec();
        let steps: Vec<KMeansStep> = run.by_ref().collect();
        let converged = steps.last().is_some_and(|step| !step.changed);
        let last = steps.last().ok_or_else(|| Error::InvalidConfiguration {
            message: "k-means produced no iterations".to_string(),
        })?;

        let result = KMeansResult {
            assignment: last.assignment.clone(),
            centroids: last.centroids.clone(),
            inertia: inertia(points, &last.assignment, &last.centroids)?,
            initial_centroids,
            converged,
            steps,
        };
        debug!(
            k = self.config.k,
            iterations = result.steps.len(),
            converged = result.converged,
            inertia = result.inertia,
            "k-means finished"
        );
        Ok(result)
    }
}

/// Iterator over k-means iterations.
///
/// Stops after the first iteration whose assignment matches the previous one,
/// or once the iteration cap is reached. The assignment before the first
/// iteration is all zeros, so a first pass that puts every point in cluster 0
/// already counts as converged.
pub struct KMeansRun<'a, R: Rng + ?Sized> {
    points: &'a [Point2D],
    rng: &'a mut R,
    initial_centroids: Vec<Point2D>,
    centroids: Vec<Point2D>,
    previous: Vec<usize>,
    iteration: usize,
    max_iterations: usize,
    finished: bool,
}

impl<R: Rng + ?Sized> KMeansRun<'_, R> {
    pub fn initial_centroids(&self) -> &[Point2D] {
        &self.initial_centroids
    }

    pub fn centroids(&self) -> &[Point2D] {
        &self.centroids
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl<R: Rng + ?Sized> Iterator for KMeansRun<'_, R> {
    type Item = KMeansStep;

    fn next(&mut self) -> Option<KMeansStep> {
        if self.finished || self.iteration >= self.max_iterations {
            self.finished = true;
            return None;
        }

        let assignment = assign_points(self.points, &self.centroids);
        let changed = self.previous != assignment;
        self.centroids = cluster_means(self.points, &assignment, self.centroids.len(), self.rng);
        self.iteration += 1;

        debug!(iteration = self.iteration, changed, "k-means iteration");

        if !changed || self.iteration >= self.max_iterations {
            self.finished = true;
        }
        self.previous.clone_from(&assignment);

        Some(KMeansStep {
            iteration: self.iteration,
            assignment,
            centroids: self.centroids.clone(),
            changed,
        })
    }
}

/// Everything a caller needs to replay or summarize a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KMeansResult {
    pub initial_centroids: Vec<Point2D>,
    pub steps: Vec<KMeansStep>,
    pub assignment: Vec<usize>,
    pub centroids: Vec<Point2D>,
    pub converged: bool,
    pub inertia: f64,
}

impl KMeansResult {
    /// Number of points in each cluster. Indices without a centroid are skipped.
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &cluster in &self.assignment {
            if let Some(size) = sizes.get_mut(cluster) {
                *size += 1;
            }
        }
        sizes
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    fn two_blobs() -> Vec<Point2D> {
        vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(0.0, 1.0),
            Point2D::new(10.0, 10.0),
            Point2D::new(11.0, 10.0),
            Point2D::new(10.0, 11.0),
        ]
    }

    #[test]
    fn assignment_breaks_ties_toward_lowest_index() {
        let points = [Point2D::new(5.0, 0.0)];
        let centroids = [Point2D::new(0.0, 0.0), Point2D::new(10.0, 0.0)];
        assert_eq!(assign_points(&points, &centroids), vec![0]);
    }

    #[test]
    fn update_uses_exact_means() {
        let points = two_blobs();
        let assignment = vec![0, 0, 0, 1, 1, 1];
        let mut rng = StdRng::seed_from_u64(1);
        let centroids = update_centroids(&points, &assignment, 2, &mut rng).unwrap();
        assert!((centroids[0].x - 1.0 / 3.0).abs() < 1e-12);
        assert!((centroids[0].y - 1.0 / 3.0).abs() < 1e-12);
        assert!((centroids[1].x - 31.0 / 3.0).abs() < 1e-12);
        assert!((centroids[1].y - 31.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn empty_cluster_is_reseeded_from_input() {
        let points = two_blobs();
        let assignment = vec![0; points.len()];
        let mut rng = StdRng::seed_from_u64(9);
        let centroids = update_centroids(&points, &assignment, 3, &mut rng).unwrap();
        assert_eq!(centroids.len(), 3);
        assert!(points.contains(&centroids[1]));
        assert!(points.contains(&centroids[2]));
    }

    #[test]
    fn init_rejects_too_many_clusters() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = init_centroids(&two_blobs(), 7, &mut rng).unwrap_err();
        assert!(matches!(err, Error::InvalidClusterCount { k: 7, points: 6 }));
    }

    #[test]
    fn init_rejects_zero_clusters_and_empty_input() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(init_centroids(&two_blobs(), 0, &mut rng).is_err());
        assert!(matches!(
            init_centroids(&[], 1, &mut rng).unwrap_err(),
            Error::EmptyInput { .. }
        ));
    }

    #[test]
    fn init_draws_from_input() {
        let points = two_blobs();
        let mut rng = StdRng::seed_from_u64(4);
        let centroids = init_centroids(&points, 4, &mut rng).unwrap();
        assert_eq!(centroids.len(), 4);
        assert!(centroids.iter().all(|c| points.contains(c)));
    }

    #[test]
    fn run_stops_at_iteration_cap() {
        let points = two_blobs();
        let mut rng = StdRng::seed_from_u64(5);
        let steps: Vec<_> = KMeans::new(KMeansConfig::new(2).with_max_iterations(1))
            .run(&points, &mut rng)
            .unwrap()
            .collect();
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].iteration, 1);
    }

    #[test]
    fn first_pass_is_compared_against_all_zero_assignment() {
        let points = two_blobs();
        // Both seeds sit in the first blob, cluster 0 wins every tie.
        let centroids = [Point2D::new(0.0, 0.0), Point2D::new(0.0, 0.0)];
        assert_eq!(assign_points(&points, &centroids), vec![0; points.len()]);

        let mut rng = StdRng::seed_from_u64(8);
        let mut run = KMeansRun {
            points: &points,
            rng: &mut rng,
            initial_centroids: centroids.to_vec(),
            centroids: centroids.to_vec(),
            previous: vec![0; points.len()],
            iteration: 0,
            max_iterations: 4,
            finished: false,
        };
        let first = run.next().unwrap();
        assert!(!first.changed);
        assert!(run.is_finished());
        assert!(run.next().is_none());
    }

    #[test]
    fn single_cluster_converges_to_global_mean() {
        let points = two_blobs();
        let mut rng = StdRng::seed_from_u64(6);
        let result = KMeans::new(KMeansConfig::new(1)).fit(&points, &mut rng).unwrap();
        // Everything lands in cluster 0, which matches the starting assignment.
        assert_eq!(result.steps.len(), 1);
        assert!(!result.steps[0].changed);
        assert!(result.converged);
        assert!((result.centroids[0].x - 16.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.cluster_sizes(), vec![6]);
    }

    #[test]
    fn iteration_rejects_empty_centroids() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(run_kmeans_iteration(&two_blobs(), &[], &mut rng).is_err());
    }

    #[test]
    fn iteration_rejects_non_finite_centroids() {
        let mut rng = StdRng::seed_from_u64(0);
        let centroids = [Point2D::new(0.0, 0.0), Point2D::new(f64::NAN, 1.0)];
        let err = run_kmeans_iteration(&two_blobs(), &centroids, &mut rng).unwrap_err();
        assert!(matches!(err, Error::NonFiniteValue { ref what, .. } if what == "centroids"));

        let centroids = [Point2D::new(f64::INFINITY, 0.0)];
        assert!(run_kmeans_iteration(&two_blobs(), &centroids, &mut rng).is_err());
    }

    #[test]
    fn inertia_is_zero_when_points_sit_on_centroids() {
        let points = [Point2D::new(1.0, 1.0), Point2D::new(2.0, 2.0)];
        assert_eq!(inertia(&points, &[0, 1], &points).unwrap(), 0.0);
    }

    #[test]
    fn out_of_range_assignments_are_rejected() {
        let points = two_blobs();
        let centroids = [Point2D::new(0.0, 0.0), Point2D::new(10.0, 10.0)];
        let mut rng = StdRng::seed_from_u64(3);

        let assignment = vec![0, 0, 0, 1, 1, 2];
        assert!(matches!(
            update_centroids(&points, &assignment, 2, &mut rng),
            Err(Error::InvalidAssignment { index: 5, cluster: 2, k: 2 })
        ));
        assert!(matches!(
            inertia(&points, &assignment, &centroids),
            Err(Error::InvalidAssignment { index: 5, cluster: 2, k: 2 })
        ));
        assert!(matches!(
            inertia(&points, &[0, 1], &centroids),
            Err(Error::LengthMismatch { expected: 6, got: 2, .. })
        ));
    }

    #[test]
    fn cluster_sizes_skip_indices_without_centroid() {
        let result = KMeansResult {
            initial_centroids: vec![Point2D::new(0.0, 0.0)],
            steps: Vec::new(),
            assignment: vec![0, 3, 0],
            centroids: vec![Point2D::new(0.0, 0.0)],
            converged: true,
            inertia: 0.0,
        };
        assert_eq!(result.cluster_sizes(), vec![2]);
    }
}
