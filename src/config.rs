use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    error::ConfigError,
    spatial::{DistanceStrategy, WindowPolicy},
};

const KM_PER_MILE: f64 = 1.609344;

/// Ten minutes on foot.
pub const DEFAULT_WALK_RADIUS_KM: f64 = 0.6 * KM_PER_MILE;
/// An hour by car.
pub const DEFAULT_DRIVE_RADIUS_KM: f64 = 7.5 * KM_PER_MILE;
pub const DEFAULT_MAX_HOPS: usize = 5;

/// Everything that changes a parcel's score.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoringConfig {
    pub walk_radius_km: f64,
    pub drive_radius_km: f64,
    pub max_hops: usize,
    pub distance: DistanceStrategy,
    pub window: WindowPolicy,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            walk_radius_km: DEFAULT_WALK_RADIUS_KM,
            drive_radius_km: DEFAULT_DRIVE_RADIUS_KM,
            max_hops: DEFAULT_MAX_HOPS,
            distance: DistanceStrategy::default(),
            window: WindowPolicy::default(),
        }
    }
}

impl ScoringConfig {
    /// Reads a JSON config; omitted fields take their defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Open {
            path: path.to_owned(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("walk_radius_km", self.walk_radius_km),
            ("drive_radius_km", self.drive_radius_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidRadius { name, value });
            }
        }

        if self.drive_radius_km < self.walk_radius_km {
            warn!(
                "Drive radius {} km is smaller than walk radius {} km",
                self.drive_radius_km, self.walk_radius_km
            );
        }
        Ok(())
    }
}
