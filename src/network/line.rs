use std::sync::Arc;

use crate::network::stop::{by_latitude, BusStop, RouteId};

/// One bus route and the stops it serves, kept sorted by [`by_latitude`].
#[derive(Debug, Clone)]
pub struct BusLine {
    pub route_id: RouteId,
    pub direction: String,
    stops: Vec<Arc<BusStop>>,
}

impl BusLine {
    pub fn new(route_id: RouteId, direction: String) -> Self {
        Self {
            route_id,
            direction,
            stops: vec![],
        }
    }

    /// Inserts `stop` at its sorted position. Returns false if it is already on the line.
    pub fn insert(&mut self, stop: Arc<BusStop>) -> bool {
        match self.stops.binary_search_by(|s| by_latitude(s, &stop)) {
            Ok(_) => false,
            Err(i) => {
                self.stops.insert(i, stop);
                true
            }
        }
    }

    pub fn stops(&self) -> &[Arc<BusStop>] {
        &self.stops
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn position(&self, stop: &BusStop) -> Option<usize> {
        self.stops.binary_search_by(|s| by_latitude(s, stop)).ok()
    }

    /// Stops at most `hops` positions away from `index` in either direction,
    /// clipped to the ends of the line.
    pub fn neighbourhood(&self, index: usize, hops: usize) -> &[Arc<BusStop>] {
        if index >= self.stops.len() {
            return &[];
        }
        let lo = index.saturating_sub(hops);
        let hi = index.saturating_add(hops).min(self.stops.len() - 1);
        &self.stops[lo..=hi]
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::network::stop::StopId;

    fn stop(id: u32, latitude: f64) -> Arc<BusStop> {
        Arc::new(BusStop::new(
            StopId::new(id),
            "NB".to_owned(),
            BTreeSet::from([RouteId::new("R1")]),
            format!("Stop {id}"),
            latitude,
            -87.6,
        ))
    }

    fn line_with(stops: &[(u32, f64)]) -> BusLine {
        let mut line = BusLine::new(RouteId::new("R1"), "NB".to_owned());
        for &(id, lat) in stops {
            line.insert(stop(id, lat));
        }
        line
    }

    fn ids(stops: &[Arc<BusStop>]) -> Vec<StopId> {
        stops.iter().map(|s| s.id).collect()
    }

    #[test]
    fn test_insert_keeps_latitude_order() {
        let line = line_with(&[(1, 41.9), (2, 41.7), (3, 41.8), (4, 41.75)]);
        assert_eq!(
            ids(line.stops()),
            vec![StopId::new(2), StopId::new(4), StopId::new(3), StopId::new(1)]
        );
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut line = line_with(&[(1, 41.9)]);
        assert!(!line.insert(stop(1, 41.9)));
        assert_eq!(line.stops().len(), 1);
    }

    #[test]
    fn test_position_with_latitude_ties() {
        let line = line_with(&[(7, 41.8), (3, 41.8), (5, 41.8), (1, 41.7)]);
        assert_eq!(line.position(&stop(1, 41.7)), Some(0));
        assert_eq!(line.position(&stop(3, 41.8)), Some(1));
        assert_eq!(line.position(&stop(5, 41.8)), Some(2));
        assert_eq!(line.position(&stop(7, 41.8)), Some(3));
        assert_eq!(line.position(&stop(9, 41.8)), None);
    }

    #[test]
    fn test_neighbourhood_clips_to_ends() {
        let line = line_with(&[(1, 41.1), (2, 41.2), (3, 41.3), (4, 41.4), (5, 41.5)]);

        assert_eq!(ids(line.neighbourhood(0, 2)), ids(&line.stops()[0..3]));
        assert_eq!(ids(line.neighbourhood(4, 1)), ids(&line.stops()[3..5]));
        assert_eq!(ids(line.neighbourhood(2, 0)), vec![StopId::new(3)]);
        assert_eq!(line.neighbourhood(2, usize::MAX).len(), 5);
        assert!(line.neighbourhood(5, 1).is_empty());
    }
}
