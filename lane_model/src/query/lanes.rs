use std::collections::BTreeSet;

use geom::{Angle, Pose};
use waypoint_graph::{ElementID, LaneID};

use super::containment::{closest_matching, containing_poly};
use crate::LanePolygon;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Every polygon of one lane, in order. Transitions leaving the lane aren't included.
pub fn lane_polys(polys: &[LanePolygon], lane: LaneID) -> Vec<&LanePolygon> {
    polys
        .iter()
        .filter(|p| p.is_lane() && p.lane_id() == lane)
        .collect()
}

/// Which lane is beside the one nearest to `pose`, on the given side? Left and right come from
/// the bearing to the neighboring lane's nearest polygon, as seen facing along the current
/// polygon.
pub fn adjacent_lane_id(polys: &[LanePolygon], pose: Pose, side: Side) -> Option<LaneID> {
    let (current, _) = closest_matching(polys, pose.pt, |p| p.is_lane())?;
    let current = &polys[current];
    let facing = pose.with_heading(current.heading());

    for delta in [-1, 1] {
        let lane = match current.lane_id().adjacent(delta) {
            Some(l) => l,
            None => continue,
        };
        let (candidate, _) =
            match closest_matching(polys, pose.pt, |p| p.is_lane() && p.lane_id() == lane) {
                Some(x) => x,
                None => continue,
            };
        let left = is_left_of(facing, &polys[candidate]);
        if left == (side == Side::Left) {
            return Some(lane);
        }
    }
    None
}

/// All polygons of the lane beside the current one, or nothing if there's no such lane.
pub fn adjacent_lane(polys: &[LanePolygon], pose: Pose, side: Side) -> Vec<&LanePolygon> {
    match adjacent_lane_id(polys, pose, side) {
        Some(lane) => lane_polys(polys, lane),
        None => Vec::new(),
    }
}

/// Finds a polygon to start from for a vehicle at `pose`, which might be off the modeled lanes
/// entirely. The polygon's heading has to be within `heading_tolerance` radians of the pose.
/// Tries the containing polygon, then the nearest polygon, then the nearest polygon of each lane
/// in the nearest polygon's segment.
pub fn starting_poly(polys: &[LanePolygon], pose: Pose, heading_tolerance: f64) -> Option<usize> {
    let matches = |idx: usize| polys[idx].heading().is_within(pose.heading, heading_tolerance);

    if let Some(idx) = containing_poly(polys, pose.pt) {
        if matches(idx) {
            return Some(idx);
        }
    }
    let (nearest, _) = closest_matching(polys, pose.pt, |_| true)?;
    if matches(nearest) {
        return Some(nearest);
    }

    let seg = polys[nearest].lane_id().seg;
    let lanes: BTreeSet<LaneID> = polys
        .iter()
        .filter(|p| p.is_lane() && p.lane_id().seg == seg)
        .map(|p| p.lane_id())
        .collect();
    let mut best = None;
    for lane in lanes {
        if let Some((idx, dist)) = closest_matching(polys, pose.pt, |p| {
            p.is_lane() && p.lane_id() == lane && p.heading().is_within(pose.heading, heading_tolerance)
        }) {
            if best.map(|(_, d)| dist < d).unwrap_or(true) {
                best = Some((idx, dist));
            }
        }
    }
    if best.is_none() {
        debug!("No polygon near {} faces the right way", pose);
    }
    best.map(|(idx, _)| idx)
}

/// The following polygon in the same lane.
pub fn next_poly(polys: &[LanePolygon], idx: usize) -> Option<usize> {
    let lane = polys.get(idx)?.lane_id();
    (idx + 1..polys.len()).find(|i| polys[*i].is_lane() && polys[*i].lane_id() == lane)
}

/// The preceding polygon in the same lane.
pub fn prev_poly(polys: &[LanePolygon], idx: usize) -> Option<usize> {
    let lane = polys.get(idx)?.lane_id();
    (0..idx)
        .rev()
        .find(|i| polys[*i].is_lane() && polys[*i].lane_id() == lane)
}

/// The polygons of `from`'s lane from `from` to `to` inclusive, in list order. `to` may come
/// first.
pub fn polys_between(polys: &[LanePolygon], from: usize, to: usize) -> Vec<&LanePolygon> {
    let lane = match polys.get(from) {
        Some(p) => p.lane_id(),
        None => return Vec::new(),
    };
    let (lo, hi) = if from <= to { (from, to) } else { (to, from) };
    polys[lo..=hi.min(polys.len() - 1)]
        .iter()
        .filter(|p| p.is_lane() && p.lane_id() == lane)
        .collect()
}

/// The first stop polygon at or after `idx` in the same lane.
pub fn stop_poly_ahead(polys: &[LanePolygon], idx: usize) -> Option<usize> {
    let lane = polys.get(idx)?.lane_id();
    (idx..polys.len()).find(|i| {
        let p = &polys[*i];
        p.is_stop && p.is_lane() && p.lane_id() == lane
    })
}

/// The anchor polygon centered on a way-point.
pub fn poly_by_way(polys: &[LanePolygon], way: ElementID) -> Option<usize> {
    polys
        .iter()
        .position(|p| p.contains_way && p.start_way == way)
}

/// The bearing from `pose` to the middle of the polygon. Positive is to the left.
pub fn bearing_to_poly(pose: Pose, poly: &LanePolygon) -> Angle {
    pose.bearing_to(poly.midpoint())
}

pub fn is_left_of(pose: Pose, poly: &LanePolygon) -> bool {
    bearing_to_poly(pose, poly).radians() > 0.0
}
