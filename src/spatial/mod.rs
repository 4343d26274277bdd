pub mod coordinate;
pub mod distance;
pub mod range;

pub use coordinate::{Coordinate, HotSpot, Parcel};
pub use distance::DistanceStrategy;
pub use range::{LatitudeIndex, WindowPolicy};
