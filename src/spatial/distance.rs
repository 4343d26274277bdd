//! Distance between two coordinates, always in kilometers.
//!
//! Two strategies are available. Haversine is the portable default. The
//! flat-plane approximation scales degree offsets by meters-per-degree
//! polynomials fitted to the Chicago study area (roughly 41.46 to 41.99
//! latitude, -87.35 to -87.37 longitude) and is meaningless elsewhere.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::spatial::Coordinate;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum DistanceStrategy {
    /// Great-circle distance on a sphere of radius 6371 km
    #[default]
    Haversine,
    /// Locally flat approximation, only valid around the study area
    FlatPlane,
}

impl DistanceStrategy {
    pub fn distance<A, B>(self, a: &A, b: &B) -> f64
    where
        A: Coordinate + ?Sized,
        B: Coordinate + ?Sized,
    {
        self.between(a.latitude(), a.longitude(), b.latitude(), b.longitude())
    }

    pub fn between(self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
        match self {
            DistanceStrategy::Haversine => haversine_km(lat1, lon1, lat2, lon2),
            DistanceStrategy::FlatPlane => flat_plane_km(lat1, lon1, lat2, lon2),
        }
    }
}

pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair past 1 for antipodal points
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

pub fn flat_plane_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let mean_lat = (lat1 + lat2) / 2.0;
    let north = (lat1 - lat2) * meters_per_degree_latitude(mean_lat);
    let east = (lon1 - lon2) * meters_per_degree_longitude(mean_lat);
    north.hypot(east) / 1000.0
}

/// Length of one degree of longitude at `lat`, in meters.
///
/// The input is latitude, not longitude: fed a longitude near -87.6 the
/// polynomial returns a negative length.
fn meters_per_degree_longitude(lat: f64) -> f64 {
    0.0003121092 * lat.powi(4) + 0.0101182384 * lat.powi(3) - 17.2385140059 * lat * lat
        + 5.5485277537 * lat
        + 111301.967182595
}

/// Length of one degree of latitude at `lat`, in meters.
fn meters_per_degree_latitude(lat: f64) -> f64 {
    -0.000000487305676 * lat.powi(4) - 0.0033668574 * lat.powi(3) + 0.4601181791 * lat * lat
        - 1.4558127346 * lat
        + 110579.25662316
}
