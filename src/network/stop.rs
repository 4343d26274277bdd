use std::{
    cmp::Ordering,
    collections::BTreeSet,
    fmt,
    hash::{Hash, Hasher},
};

use geo_types::Point;

use crate::spatial::{coordinate::cmp_latitude, Coordinate};

/// The transit agency's system stop number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StopId(u32);

impl StopId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RouteId(String);

impl RouteId {
    pub fn new(str: &str) -> Self {
        Self(str.to_owned())
    }
}

impl fmt::Display for RouteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A bus stop. Equality and hashing go through `id` only.
#[derive(Debug, Clone)]
pub struct BusStop {
    pub id: StopId,
    pub direction: String,
    pub routes: BTreeSet<RouteId>,
    pub public_name: String,
    pub point: Point,
}

impl BusStop {
    pub fn new(
        id: StopId,
        direction: String,
        routes: BTreeSet<RouteId>,
        public_name: String,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id,
            direction,
            routes,
            public_name,
            point: Point::new(longitude, latitude),
        }
    }
}

impl Coordinate for BusStop {
    fn latitude(&self) -> f64 {
        self.point.y()
    }

    fn longitude(&self) -> f64 {
        self.point.x()
    }
}

impl PartialEq for BusStop {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for BusStop {}

impl Hash for BusStop {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// Orders stops by system stop number.
pub fn by_identity(a: &BusStop, b: &BusStop) -> Ordering {
    a.id.cmp(&b.id)
}

/// Orders stops along a route: by latitude, ties broken by system stop number
/// so that every stop has exactly one position.
pub fn by_latitude(a: &BusStop, b: &BusStop) -> Ordering {
    cmp_latitude(a, b).then_with(|| by_identity(a, b))
}
