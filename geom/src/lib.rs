//! Planar geometry for lane models. Everything lives in a local Euclidean frame measured in
//! meters, except for `LonLat`, which is only used until a graph establishes its frame.

mod angle;
mod bounds;
mod distance;
mod gps;
mod line;
mod pose;
mod pt;
mod vector;

pub use crate::angle::{normalize_radians, Angle};
pub use crate::bounds::Bounds;
pub use crate::distance::Distance;
pub use crate::gps::{GPSBounds, LonLat, UtmCoord};
pub use crate::line::Line;
pub use crate::pose::Pose;
pub use crate::pt::Pt2D;
pub use crate::vector::Vec2D;

/// Points closer than this are considered the same.
pub const EPSILON_DIST: Distance = Distance::const_meters(0.0001);
