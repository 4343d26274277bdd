pub mod io;
pub mod line;
pub mod stop;

use std::{collections::HashMap, sync::Arc};

use crate::network::{
    line::BusLine,
    stop::{BusStop, RouteId},
};

/// All bus lines keyed by route id.
#[derive(Debug, Clone, Default)]
pub struct BusNetwork {
    lines: HashMap<RouteId, BusLine>,
}

impl BusNetwork {
    /// Builds the network; for a repeated route id the first line wins.
    pub fn new(lines: impl IntoIterator<Item = BusLine>) -> Self {
        let mut lookup = HashMap::new();
        for line in lines {
            lookup.entry(line.route_id.clone()).or_insert(line);
        }
        Self { lines: lookup }
    }

    pub fn line(&self, route: &RouteId) -> Option<&BusLine> {
        self.lines.get(route)
    }

    pub fn lines(&self) -> impl Iterator<Item = &BusLine> {
        self.lines.values()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Places `stop` on every line it serves. Returns the routes it claims
    /// that the network does not know about.
    pub fn add_stop(&mut self, stop: &Arc<BusStop>) -> Vec<RouteId> {
        let mut unknown = vec![];
        for route in &stop.routes {
            match self.lines.get_mut(route) {
                Some(line) => {
                    line.insert(Arc::clone(stop));
                }
                None => unknown.push(route.clone()),
            }
        }
        unknown
    }
}
