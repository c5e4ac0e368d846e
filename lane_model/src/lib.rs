//! A geometric model of the lanes described by a way-point graph: an ordered list of
//! quadrilateral polygons tiling every lane and every transition between lanes.
//!
//! `LaneModel::new` synthesizes the polygons. The `query` module locates points among them and
//! answers lane-relative questions. Each polygon corner also carries a small Kalman filter, so
//! the model can be nudged towards what a vehicle actually observes.

#[macro_use]
extern crate log;

mod config;
mod corner_filter;
mod curve;
pub mod kalman;
pub mod make;
mod model;
mod polygon;
pub mod query;

pub use crate::config::{CurrentPoseConfig, FilterConfig, LaneModelConfig};
pub use crate::corner_filter::FilteredCorner;
pub use crate::curve::{LaneCurve, TangentMode};
pub use crate::model::{CornerObservation, CornerOutcome, LaneModel};
pub use crate::polygon::{LanePolygon, BOTTOM_LEFT, BOTTOM_RIGHT, TOP_LEFT, TOP_RIGHT};
