//! How far a rider gets within a bounded number of stops.
//!
//! Two stops are adjacent when they sit next to each other on the same
//! line's stop sequence. Starting from a set of stops, every stop within
//! `max_hops` positions along any line the start serves is reachable.

use std::{collections::BTreeMap, sync::Arc};

use tracing::debug;

use crate::network::{
    stop::{BusStop, StopId},
    BusNetwork,
};

/// Reachable stops keyed, and thus deduplicated, by stop id.
pub type ReachableStops = BTreeMap<StopId, Arc<BusStop>>;

pub fn reachable_stops<'a, I>(network: &BusNetwork, starting: I, max_hops: usize) -> ReachableStops
where
    I: IntoIterator<Item = &'a Arc<BusStop>>,
{
    let mut reached = BTreeMap::new();

    for start in starting {
        reached
            .entry(start.id)
            .or_insert_with(|| Arc::clone(start));

        for route in &start.routes {
            let Some(line) = network.line(route) else {
                debug!("Stop {} serves unknown route {route}, skipping", start.id);
                continue;
            };
            let Some(index) = line.position(start) else {
                debug!("Stop {} is missing from line {route}, skipping", start.id);
                continue;
            };

            for stop in line.neighbourhood(index, max_hops) {
                reached.entry(stop.id).or_insert_with(|| Arc::clone(stop));
            }
        }
    }

    reached
}
