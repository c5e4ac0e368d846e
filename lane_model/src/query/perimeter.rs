use geom::{Pt2D, EPSILON_DIST};
use waypoint_graph::LaneID;

use super::lane_polys;
use crate::polygon::{BOTTOM_LEFT, BOTTOM_RIGHT, TOP_LEFT, TOP_RIGHT};
use crate::LanePolygon;

/// The outline of one lane, traced along its polygons' sides in the direction of travel.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneBoundaries {
    pub left: Vec<Pt2D>,
    pub right: Vec<Pt2D>,
}

/// Coincident corners of neighboring polygons appear once. Empty if the lane has no polygons.
pub fn lane_boundaries(polys: &[LanePolygon], lane: LaneID) -> LaneBoundaries {
    let mut left = Vec::new();
    let mut right = Vec::new();
    for poly in lane_polys(polys, lane) {
        push_dedupe(&mut left, poly.corner(BOTTOM_LEFT));
        push_dedupe(&mut left, poly.corner(TOP_LEFT));
        push_dedupe(&mut right, poly.corner(BOTTOM_RIGHT));
        push_dedupe(&mut right, poly.corner(TOP_RIGHT));
    }
    LaneBoundaries { left, right }
}

fn push_dedupe(pts: &mut Vec<Pt2D>, pt: Pt2D) {
    if pts.last().map(|last| last.approx_eq(pt, EPSILON_DIST)) != Some(true) {
        pts.push(pt);
    }
}
