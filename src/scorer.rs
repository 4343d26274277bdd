use std::{collections::BTreeSet, sync::Arc};

use indicatif::ProgressBar;
use rayon::prelude::*;
use tracing::debug;

use crate::{
    config::ScoringConfig,
    network::{stop::BusStop, BusNetwork},
    reachability::reachable_stops,
    spatial::{Coordinate, HotSpot, LatitudeIndex, Parcel},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Execution {
    Sequential,
    Parallel,
}

/// The accessibility index of one parcel and the counts behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct ParcelScore {
    pub parcel: Parcel,
    pub starting_stops: usize,
    pub reachable_stops: usize,
    pub reachable_hot_spots: usize,
    pub drivable_hot_spots: usize,
    /// `None` when no hot spot is within driving distance.
    pub score: Option<f64>,
}

/// Scores parcels against a bus network and a set of hot spots, all of
/// which stay read-only once the scorer is built.
pub struct AccessibilityScorer {
    network: BusNetwork,
    stops: LatitudeIndex<Arc<BusStop>>,
    hot_spots: LatitudeIndex<HotSpot>,
    config: ScoringConfig,
}

impl AccessibilityScorer {
    pub fn new(
        network: BusNetwork,
        stops: LatitudeIndex<Arc<BusStop>>,
        hot_spots: LatitudeIndex<HotSpot>,
        config: ScoringConfig,
    ) -> Self {
        Self {
            network,
            stops,
            hot_spots,
            config,
        }
    }

    pub fn score_parcel(&self, parcel: &Parcel) -> ParcelScore {
        let ScoringConfig {
            walk_radius_km,
            drive_radius_km,
            max_hops,
            distance,
            window,
        } = self.config;

        let starting = self.stops.within_range(
            parcel.latitude(),
            parcel.longitude(),
            walk_radius_km,
            distance,
            window,
        );
        let starting_stops = starting.len();

        let reached = reachable_stops(&self.network, starting, max_hops);

        // Positions in the hot spot index double as identities for deduplication
        let reachable: BTreeSet<usize> = reached
            .values()
            .flat_map(|stop| {
                self.hot_spots.positions_within(
                    stop.latitude(),
                    stop.longitude(),
                    walk_radius_km,
                    distance,
                    window,
                )
            })
            .collect();

        let drivable = self
            .hot_spots
            .positions_within(
                parcel.latitude(),
                parcel.longitude(),
                drive_radius_km,
                distance,
                window,
            )
            .len();

        let score = (drivable > 0).then(|| reachable.len() as f64 / drivable as f64);

        debug!(
            parcel = %parcel.id,
            starting_stops,
            reachable_stops = reached.len(),
            reachable_hot_spots = reachable.len(),
            drivable_hot_spots = drivable,
            ?score,
            "Scored parcel"
        );

        ParcelScore {
            parcel: parcel.clone(),
            starting_stops,
            reachable_stops: reached.len(),
            reachable_hot_spots: reachable.len(),
            drivable_hot_spots: drivable,
            score,
        }
    }

    /// Scores every parcel, returning results in input order.
    pub fn score_all(
        &self,
        parcels: &[Parcel],
        execution: Execution,
        progress: &ProgressBar,
    ) -> Vec<ParcelScore> {
        let score = |parcel: &Parcel| {
            let result = self.score_parcel(parcel);
            progress.inc(1);
            result
        };

        match execution {
            Execution::Sequential => parcels.iter().map(score).collect(),
            Execution::Parallel => parcels.par_iter().map(score).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub parcels: usize,
    pub undefined: usize,
    pub mean_score: Option<f64>,
}

impl RunSummary {
    pub fn from_scores(scores: &[ParcelScore]) -> Self {
        let defined: Vec<f64> = scores.iter().filter_map(|s| s.score).collect();
        let mean_score =
            (!defined.is_empty()).then(|| defined.iter().sum::<f64>() / defined.len() as f64);

        Self {
            parcels: scores.len(),
            undefined: scores.len() - defined.len(),
            mean_score,
        }
    }
}
