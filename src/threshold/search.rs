//! Exhaustive dual-threshold search and interval classification

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{Error, Result, ensure_finite},
    types::{LabeledSample, Point2D},
};

/// Candidate grid used by the threshold search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Lowest candidate threshold
    pub domain_min: f64,
    /// Highest candidate threshold
    pub domain_max: f64,
    /// Spacing between candidates
    pub step: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            domain_min: 0.0,
            domain_max: 10.0,
            step: 0.25,
        }
    }
}

impl ThresholdConfig {
    /// Upper bound on candidates per axis; the search visits every ordered pair.
    pub const MAX_CANDIDATES: usize = 1001;

    pub fn validate(&self) -> Result<()> {
        ensure_finite(
            "threshold domain",
            &[self.domain_min, self.domain_max, self.step],
        )?;
        if self.domain_min >= self.domain_max {
            return Err(Error::InvalidConfiguration {
                message: format!(
                    "threshold domain [{}, {}] is empty",
                    self.domain_min, self.domain_max
                ),
            });
        }
        let range = self.domain_max - self.domain_min;
        if self.step <= 0.0 || self.step > range {
            return Err(Error::InvalidHyperparameter {
                name: "step".to_string(),
                value: self.step,
                expected: format!("0 < step <= {range}"),
            });
        }
        let min_step = range / (Self::MAX_CANDIDATES - 1) as f64;
        if (range / self.step).round() + 1.0 > Self::MAX_CANDIDATES as f64 {
            return Err(Error::InvalidHyperparameter {
                name: "step".to_string(),
                value: self.step,
                expected: format!(
                    "step >= {min_step} (at most {} candidates)",
                    Self::MAX_CANDIDATES
                ),
            });
        }
        Ok(())
    }

    /// Centre of the domain, used to break ties between equally good windows.
    pub fn center(&self) -> f64 {
        (self.domain_min + self.domain_max) / 2.0
    }

    /// All candidate cut points in ascending order.
    pub fn candidates(&self) -> Vec<f64> {
        let steps = ((self.domain_max - self.domain_min) / self.step).round() as usize;
        (0..=steps)
            .map(|i| (self.domain_min + i as f64 * self.step).min(self.domain_max))
            .collect()
    }
}

/// The learned "accept" interval `[low, high]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPair {
    pub low: f64,
    pub high: f64,
}

impl ThresholdPair {
    pub fn new(low: f64, high: f64) -> Result<Self> {
        ensure_finite("threshold pair", &[low, high])?;
        if low > high {
            return Err(Error::InvalidConfiguration {
                message: format!("threshold low {low} exceeds high {high}"),
            });
        }
        Ok(Self { low, high })
    }

    /// Inclusive interval membership.
    pub fn contains(&self, x: f64) -> bool {
        self.low <= x && x <= self.high
    }

    pub fn midpoint(&self) -> f64 {
        (self.low + self.high) / 2.0
    }
}

/// Result of a threshold search: the winning pair and its error count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdFit {
    pub thresholds: ThresholdPair,
    /// Misclassified training points under `thresholds`
    pub error: usize,
}

/// Positives outside the window plus negatives inside it.
pub fn classification_error(thresholds: ThresholdPair, positives: &[f64], negatives: &[f64]) -> usize {
    let missed = positives.iter().filter(|&&x| !thresholds.contains(x)).count();
    let false_alarms = negatives.iter().filter(|&&x| thresholds.contains(x)).count();
    missed + false_alarms
}

/// Positive iff `low <= x <= high`.
pub fn classify(x: f64, thresholds: ThresholdPair) -> bool {
    thresholds.contains(x)
}

/// Search the default 0.25-spaced grid over [0, 10].
pub fn find_thresholds(positives: &[f64], negatives: &[f64]) -> Result<ThresholdFit> {
    find_thresholds_with(&ThresholdConfig::default(), positives, negatives)
}

/// Evaluate every candidate pair `low < high` and keep the one with the fewest
/// errors. Ties go to the window whose midpoint is closest to the domain centre,
/// then to the pair enumerated first.
///
/// Empty class sets are accepted; they simply leave the window under-constrained.
pub fn find_thresholds_with(
    config: &ThresholdConfig,
    positives: &[f64],
    negatives: &[f64],
) -> Result<ThresholdFit> {
    config.validate()?;
    ensure_finite("positive samples", positives)?;
    ensure_finite("negative samples", negatives)?;

    let candidates = config.candidates();
    let center = config.center();

    let mut best: Option<(ThresholdFit, f64)> = None;
    let mut evaluated = 0usize;

    for (i, &low) in candidates.iter().enumerate() {
        for &high in &candidates[i + 1..] {
            let pair = ThresholdPair { low, high };
            let error = classification_error(pair, positives, negatives);
            let distance = (pair.midpoint() - center).abs();
            evaluated += 1;

            let better = match &best {
                None => true,
                Some((fit, best_distance)) => {
                    error < fit.error || (error == fit.error && distance < *best_distance)
                }
            };
            if better {
                best = Some((
                    ThresholdFit {
                        thresholds: pair,
                        error,
                    },
                    distance,
                ));
            }
        }
    }

    let (fit, _) = best.ok_or_else(|| Error::InvalidConfiguration {
        message: "threshold grid yields no candidate pairs".to_string(),
    })?;

    debug!(
        pairs = evaluated,
        low = fit.thresholds.low,
        high = fit.thresholds.high,
        error = fit.error,
        "threshold search finished"
    );

    Ok(fit)
}

/// Labeled training bananas in the order they were labeled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingSet {
    samples: Vec<LabeledSample>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the label for one sample.
    pub fn label(&mut self, point: Point2D, positive: bool) {
        self.samples.push(LabeledSample::new(point, positive));
    }

    pub fn samples(&self) -> &[LabeledSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn positives(&self) -> Vec<f64> {
        self.scalars(true)
    }

    pub fn negatives(&self) -> Vec<f64> {
        self.scalars(false)
    }

    fn scalars(&self, positive: bool) -> Vec<f64> {
        self.samples
            .iter()
            .filter(|sample| sample.positive == positive)
            .map(|sample| sample.point.x)
            .collect()
    }

    /// Learn thresholds from the labeled samples.
    pub fn fit(&self, config: &ThresholdConfig) -> Result<ThresholdFit> {
        find_thresholds_with(config, &self.positives(), &self.negatives())
    }
}

impl FromIterator<LabeledSample> for TrainingSet {
    fn from_iter<T: IntoIterator<Item = LabeledSample>>(iter: T) -> Self {
        Self {
            samples: iter.into_iter().collect(),
        }
    }
}

/// Outcome of classifying a batch of unseen points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub positives: Vec<Point2D>,
    pub negatives: Vec<Point2D>,
}

impl ClassificationReport {
    pub fn classify_all(points: &[Point2D], thresholds: ThresholdPair) -> Self {
        let (positives, negatives) = points
            .iter()
            .partition(|point| classify(point.x, thresholds));
        Self {
            positives,
            negatives,
        }
    }

    pub fn positive_count(&self) -> usize {
        self.positives.len()
    }

    pub fn negative_count(&self) -> usize {
        self.negatives.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_grid_has_41_candidates() {
        let candidates = ThresholdConfig::default().candidates();
        assert_eq!(candidates.len(), 41);
        assert_eq!(candidates[0], 0.0);
        assert_eq!(candidates[1], 0.25);
        assert_eq!(candidates[40], 10.0);
    }

    #[test]
    fn candidate_grid_is_bounded() {
        let at_limit = ThresholdConfig {
            step: 0.01,
            ..ThresholdConfig::default()
        };
        assert!(at_limit.validate().is_ok());
        assert_eq!(at_limit.candidates().len(), ThresholdConfig::MAX_CANDIDATES);

        for step in [0.005, 1e-12] {
            let config = ThresholdConfig {
                step,
                ..ThresholdConfig::default()
            };
            assert!(matches!(
                config.validate(),
                Err(Error::InvalidHyperparameter { ref name, .. }) if name == "step"
            ));
            assert!(find_thresholds_with(&config, &[2.0], &[8.0]).is_err());
        }
    }

    #[test]
    fn separable_window_has_zero_error() {
        let fit = find_thresholds(&[2.0, 3.0, 4.0, 5.0], &[8.0, 9.0]).unwrap();
        assert_eq!(fit.error, 0);
        // Zero-error windows have low <= 2 and 5 <= high < 8; the widest midpoint wins.
        assert_eq!(fit.thresholds, ThresholdPair { low: 2.0, high: 7.75 });
    }

    #[test]
    fn empty_classes_fall_back_to_centred_window() {
        let fit = find_thresholds(&[], &[]).unwrap();
        assert_eq!(fit.error, 0);
        assert_eq!(fit.thresholds, ThresholdPair { low: 0.0, high: 10.0 });
    }

    #[test]
    fn only_negatives_pushes_window_away() {
        let fit = find_thresholds(&[], &[4.0, 5.0, 6.0]).unwrap();
        assert_eq!(fit.error, 0);
        assert!(!fit.thresholds.contains(4.0));
        assert!(!fit.thresholds.contains(5.0));
        assert!(!fit.thresholds.contains(6.0));
    }

    #[test]
    fn overlapping_classes_report_minimum_error() {
        let positives = [4.0, 5.0, 6.0];
        let negatives = [5.0, 9.0];
        let fit = find_thresholds(&positives, &negatives).unwrap();
        assert_eq!(fit.error, 1);
        assert_eq!(
            classification_error(fit.thresholds, &positives, &negatives),
            fit.error
        );
    }

    #[test]
    fn classify_bounds_are_inclusive() {
        let pair = ThresholdPair::new(2.0, 4.0).unwrap();
        assert!(classify(2.0, pair));
        assert!(classify(4.0, pair));
        assert!(!classify(1.99, pair));
        assert!(!classify(4.01, pair));
    }

    #[test]
    fn rejects_non_finite_samples() {
        let err = find_thresholds(&[f64::NAN], &[]).unwrap_err();
        assert!(matches!(err, Error::NonFiniteValue { .. }));
    }

    #[test]
    fn rejects_inverted_pair() {
        assert!(ThresholdPair::new(5.0, 1.0).is_err());
    }

    #[test]
    fn training_set_splits_by_label() {
        let mut set = TrainingSet::new();
        set.label(Point2D::new(3.0, 1.0), true);
        set.label(Point2D::new(9.0, 1.0), false);
        set.label(Point2D::new(4.0, 1.0), true);
        assert_eq!(set.positives(), vec![3.0, 4.0]);
        assert_eq!(set.negatives(), vec![9.0]);

        let fit = set.fit(&ThresholdConfig::default()).unwrap();
        assert_eq!(fit.error, 0);
    }

    #[test]
    fn report_partitions_points() {
        let pair = ThresholdPair::new(3.0, 6.0).unwrap();
        let points = [
            Point2D::new(1.0, 0.5),
            Point2D::new(3.5, 0.5),
            Point2D::new(6.0, 0.5),
            Point2D::new(8.0, 0.5),
        ];
        let report = ClassificationReport::classify_all(&points, pair);
        assert_eq!(report.positive_count(), 2);
        assert_eq!(report.negative_count(), 2);
    }
}
