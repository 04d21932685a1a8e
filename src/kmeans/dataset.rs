//! Synthetic "song" data: energy vs danceability

use std::f64::consts::TAU;

use rand::Rng;

use crate::types::Point2D;

/// Cluster centres the songs are scattered around.
pub const SONG_CENTERS: [Point2D; 5] = [
    Point2D::new(20.0, 80.0),
    Point2D::new(80.0, 80.0),
    Point2D::new(20.0, 20.0),
    Point2D::new(80.0, 20.0),
    Point2D::new(50.0, 50.0),
];

/// Songs per centre (100 in total)
pub const SONG_CLUSTER_SIZES: [usize; 5] = [22, 22, 22, 22, 12];

const OUTER_SPREAD: f64 = 25.0;
const INNER_SPREAD: f64 = 15.0;
const COORD_MIN: f64 = 5.0;
const COORD_MAX: f64 = 95.0;

/// Scatter songs around the five centres with a uniform angle and radius,
/// clamped into [5, 95]. The middle cluster is tighter.
pub fn generate_spread_songs<R: Rng + ?Sized>(rng: &mut R) -> Vec<Point2D> {
    let total = SONG_CLUSTER_SIZES.iter().sum();
    let mut songs = Vec::with_capacity(total);

    for (index, (center, &size)) in SONG_CENTERS.iter().zip(&SONG_CLUSTER_SIZES).enumerate() {
        let spread = if index == SONG_CENTERS.len() - 1 {
            INNER_SPREAD
        } else {
            OUTER_SPREAD
        };
        for _ in 0..size {
            let angle = rng.random::<f64>() * TAU;
            let radius = rng.random::<f64>() * spread;
            songs.push(Point2D::new(
                (center.x + angle.cos() * radius).clamp(COORD_MIN, COORD_MAX),
                (center.y + angle.sin() * radius).clamp(COORD_MIN, COORD_MAX),
            ));
        }
    }
    songs
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn generates_one_hundred_clamped_songs() {
        let mut rng = StdRng::seed_from_u64(12);
        let songs = generate_spread_songs(&mut rng);
        assert_eq!(songs.len(), 100);
        assert!(songs.iter().all(|p| {
            (COORD_MIN..=COORD_MAX).contains(&p.x) && (COORD_MIN..=COORD_MAX).contains(&p.y)
        }));
    }

    #[test]
    fn middle_cluster_stays_within_inner_spread() {
        let mut rng = StdRng::seed_from_u64(13);
        let songs = generate_spread_songs(&mut rng);
        let center = SONG_CENTERS[4];
        assert!(songs[88..].iter().all(|p| p.distance(&center) <= INNER_SPREAD + 1e-9));
    }
}
