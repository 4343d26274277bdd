use std::{cmp::Ordering, sync::Arc};

use geo_types::Point;

/// A position on the globe in decimal degrees.
pub trait Coordinate {
    fn latitude(&self) -> f64;
    fn longitude(&self) -> f64;
}

impl Coordinate for Point {
    fn latitude(&self) -> f64 {
        self.y()
    }

    fn longitude(&self) -> f64 {
        self.x()
    }
}

impl<T: Coordinate + ?Sized> Coordinate for Arc<T> {
    fn latitude(&self) -> f64 {
        (**self).latitude()
    }

    fn longitude(&self) -> f64 {
        (**self).longitude()
    }
}

/// Orders two coordinates by latitude only.
pub fn cmp_latitude<A: Coordinate + ?Sized, B: Coordinate + ?Sized>(a: &A, b: &B) -> Ordering {
    a.latitude().total_cmp(&b.latitude())
}

pub fn is_valid_position(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

/// A destination whose accessibility is being measured.
#[derive(Debug, Clone, PartialEq)]
pub struct HotSpot {
    pub id: String,
    pub point: Point,
}

impl HotSpot {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            point: Point::new(longitude, latitude),
        }
    }
}

impl Coordinate for HotSpot {
    fn latitude(&self) -> f64 {
        self.point.y()
    }

    fn longitude(&self) -> f64 {
        self.point.x()
    }
}

/// A land parcel centroid, the unit the accessibility index is computed for.
#[derive(Debug, Clone, PartialEq)]
pub struct Parcel {
    pub id: String,
    pub point: Point,
}

impl Parcel {
    pub fn new(id: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: id.into(),
            point: Point::new(longitude, latitude),
        }
    }
}

impl Coordinate for Parcel {
    fn latitude(&self) -> f64 {
        self.point.y()
    }

    fn longitude(&self) -> f64 {
        self.point.x()
    }
}
