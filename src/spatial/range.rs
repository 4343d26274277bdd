//! Range queries over coordinates sorted by latitude.
//!
//! A query first narrows the sorted slice to a window of candidates whose
//! latitude alone keeps them inside the radius, then re-checks every
//! candidate with the exact distance. The latitude-only distance never
//! exceeds the full distance for either strategy, so the window can only
//! over-select; the exact filter decides membership.

use clap::ValueEnum;
use geo_types::Point;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::spatial::{coordinate::cmp_latitude, Coordinate, DistanceStrategy};

/// How the candidate window around the query latitude is found.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum WindowPolicy {
    /// Walk outward one element at a time
    Monotonic,
    /// Binary search each side for the radius boundary
    #[default]
    BinaryBounded,
}

/// Returns the positions in `coordinates` strictly closer than `radius` to
/// the query point, in ascending order.
///
/// `coordinates` must already be sorted by latitude; [`LatitudeIndex`] is
/// the only caller outside tests and sorts once when built.
fn positions_within<T: Coordinate>(
    coordinates: &[T],
    lat: f64,
    lon: f64,
    radius: f64,
    distance: DistanceStrategy,
    policy: WindowPolicy,
) -> Vec<usize> {
    if coordinates.is_empty() || !(radius > 0.0) {
        return vec![];
    }
    let (lo, hi) = window(coordinates, lat, lon, radius, distance, policy);
    let query = Point::new(lon, lat);

    (lo..hi)
        .filter(|&i| distance.distance(&coordinates[i], &query) < radius)
        .collect()
}

/// Same as [`positions_within`] but yields the matching records.
fn within_range<'a, T: Coordinate>(
    coordinates: &'a [T],
    lat: f64,
    lon: f64,
    radius: f64,
    distance: DistanceStrategy,
    policy: WindowPolicy,
) -> Vec<&'a T> {
    positions_within(coordinates, lat, lon, radius, distance, policy)
        .into_iter()
        .map(|i| &coordinates[i])
        .collect()
}

/// Half-open index window `[lo, hi)` of candidates for the query.
fn window<T: Coordinate>(
    coordinates: &[T],
    lat: f64,
    lon: f64,
    radius: f64,
    distance: DistanceStrategy,
    policy: WindowPolicy,
) -> (usize, usize) {
    // Distance from the query to the candidate's latitude along the query meridian
    let latitude_gap = |c: &T| distance.between(c.latitude(), lon, lat, lon);

    // First position whose latitude is >= the query latitude
    let index = coordinates.partition_point(|c| c.latitude() < lat);

    match policy {
        WindowPolicy::Monotonic => {
            let mut lo = index;
            while lo > 0 && latitude_gap(&coordinates[lo - 1]) < radius {
                lo -= 1;
            }
            let mut hi = index;
            while hi < coordinates.len() && latitude_gap(&coordinates[hi]) < radius {
                hi += 1;
            }
            (lo, hi)
        }
        WindowPolicy::BinaryBounded => {
            let lo = coordinates[..index].partition_point(|c| latitude_gap(c) >= radius);
            let hi = index + coordinates[index..].partition_point(|c| latitude_gap(c) < radius);
            (lo, hi)
        }
    }
}

/// An immutable collection kept sorted by latitude for range queries.
#[derive(Debug, Clone)]
pub struct LatitudeIndex<T> {
    items: Vec<T>,
}

impl<T: Coordinate> LatitudeIndex<T> {
    pub fn new(items: Vec<T>) -> Self {
        let items = items
            .into_iter()
            .sorted_by(|a, b| cmp_latitude(a, b))
            .collect();
        Self { items }
    }

    pub fn within_range(
        &self,
        lat: f64,
        lon: f64,
        radius: f64,
        distance: DistanceStrategy,
        policy: WindowPolicy,
    ) -> Vec<&T> {
        within_range(self.as_slice(), lat, lon, radius, distance, policy)
    }

    pub fn positions_within(
        &self,
        lat: f64,
        lon: f64,
        radius: f64,
        distance: DistanceStrategy,
        policy: WindowPolicy,
    ) -> Vec<usize> {
        positions_within(self.as_slice(), lat, lon, radius, distance, policy)
    }
}

impl<T> LatitudeIndex<T> {
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLICIES: [WindowPolicy; 2] = [WindowPolicy::Monotonic, WindowPolicy::BinaryBounded];
    const STRATEGIES: [DistanceStrategy; 2] =
        [DistanceStrategy::Haversine, DistanceStrategy::FlatPlane];

    /// Deterministic scatter of points around downtown Chicago.
    fn scatter(n: usize, seed: u64) -> LatitudeIndex<Point> {
        let mut state = seed;
        let mut next = move || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            ((state >> 11) as f64) / ((1u64 << 53) as f64)
        };
        let points = (0..n)
            .map(|_| {
                let lat = 41.70 + next() * 0.30;
                let lon = -87.80 + next() * 0.30;
                Point::new(lon, lat)
            })
            .collect();
        LatitudeIndex::new(points)
    }

    fn brute_force(
        points: &[Point],
        lat: f64,
        lon: f64,
        radius: f64,
        distance: DistanceStrategy,
    ) -> Vec<usize> {
        (0..points.len())
            .filter(|&i| distance.between(points[i].y(), points[i].x(), lat, lon) < radius)
            .collect()
    }

    #[test]
    fn test_matches_brute_force_for_both_policies() {
        let index = scatter(500, 7);
        let queries = [(41.85, -87.65), (41.70, -87.80), (42.10, -87.60), (41.95, -87.50)];

        for distance in STRATEGIES {
            for (lat, lon) in queries {
                for radius in [0.05, 0.5, 1.0, 3.0, 50.0] {
                    let expected = brute_force(index.as_slice(), lat, lon, radius, distance);
                    for policy in POLICIES {
                        let found = index.positions_within(lat, lon, radius, distance, policy);
                        assert_eq!(found, expected, "{distance:?} {policy:?} r={radius}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_empty_input() {
        let points: Vec<Point> = vec![];
        for policy in POLICIES {
            let found = within_range(&points, 41.8, -87.6, 5.0, DistanceStrategy::Haversine, policy);
            assert!(found.is_empty());
        }
    }

    #[test]
    fn test_non_positive_radius() {
        let points = vec![Point::new(-87.6, 41.8)];
        for policy in POLICIES {
            for radius in [0.0, -1.0, f64::NAN] {
                let found =
                    within_range(&points, 41.8, -87.6, radius, DistanceStrategy::Haversine, policy);
                assert!(found.is_empty());
            }
        }
    }

    #[test]
    fn test_coincident_point_included() {
        let points = vec![Point::new(-87.6, 41.8)];
        for policy in POLICIES {
            let found =
                within_range(&points, 41.8, -87.6, 0.001, DistanceStrategy::Haversine, policy);
            assert_eq!(found, vec![&points[0]]);
        }
    }

    #[test]
    fn test_single_element_outside() {
        let points = vec![Point::new(-87.6, 41.8)];
        for policy in POLICIES {
            let above = within_range(&points, 42.8, -87.6, 1.0, DistanceStrategy::Haversine, policy);
            let below = within_range(&points, 40.8, -87.6, 1.0, DistanceStrategy::Haversine, policy);
            assert!(above.is_empty());
            assert!(below.is_empty());
        }
    }

    #[test]
    fn test_same_latitude_different_longitude() {
        // Latitude window admits all three, exact filter rejects the far one
        let index = LatitudeIndex::new(vec![
            Point::new(-87.600, 41.8),
            Point::new(-87.601, 41.8),
            Point::new(-87.700, 41.8),
        ]);
        for policy in POLICIES {
            let found = index.within_range(41.8, -87.6, 0.5, DistanceStrategy::Haversine, policy);
            assert_eq!(found.len(), 2);
        }
    }

    #[test]
    fn test_unsorted_input_is_queryable() {
        let scattered = scatter(200, 11);
        let mut reversed = scattered.as_slice().to_vec();
        reversed.reverse();
        let index = LatitudeIndex::new(reversed);

        assert!(index
            .as_slice()
            .windows(2)
            .all(|w| cmp_latitude(&w[0], &w[1]).is_le()));
        for policy in POLICIES {
            let found =
                index.positions_within(41.85, -87.65, 2.0, DistanceStrategy::Haversine, policy);
            let expected = brute_force(
                index.as_slice(),
                41.85,
                -87.65,
                2.0,
                DistanceStrategy::Haversine,
            );
            assert_eq!(found, expected);
            assert!(!found.is_empty());
        }
    }

    #[test]
    fn test_index_sorts_by_latitude() {
        let index = LatitudeIndex::new(vec![
            Point::new(0.0, 3.0),
            Point::new(0.0, 1.0),
            Point::new(0.0, 2.0),
        ]);
        let lats: Vec<f64> = index.as_slice().iter().map(|p| p.y()).collect();
        assert_eq!(lats, vec![1.0, 2.0, 3.0]);
    }
}
