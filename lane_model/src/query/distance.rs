use geom::{Distance, Pt2D};

use super::closest_poly;
use crate::LanePolygon;

/// How far along the midline of `poly` the projection of `pt` lands, clamped to the polygon.
pub fn dist_along_poly(poly: &LanePolygon, pt: Pt2D) -> Distance {
    poly.midline().dist_along_of_point(pt)
}

/// The distance from `from` to `to` measured along the polygons, found by snapping each point
/// to its nearest polygon. Negative when `to` comes earlier in the list. Zero if there are no
/// polygons.
pub fn distance_along_lane(polys: &[LanePolygon], from: Pt2D, to: Pt2D) -> Distance {
    let (i, j) = match (closest_poly(polys, from), closest_poly(polys, to)) {
        (Some(i), Some(j)) => (i, j),
        _ => return Distance::ZERO,
    };
    if i == j {
        return dist_along_poly(&polys[i], to) - dist_along_poly(&polys[i], from);
    }
    if j < i {
        return -forwards(polys, j, to, i, from);
    }
    forwards(polys, i, from, j, to)
}

/// Assumes `i < j`.
fn forwards(polys: &[LanePolygon], i: usize, from: Pt2D, j: usize, to: Pt2D) -> Distance {
    let rest_of_first = polys[i].length() - dist_along_poly(&polys[i], from);
    let between: Distance = polys[i + 1..j].iter().map(|p| p.length()).sum();
    rest_of_first + between + dist_along_poly(&polys[j], to)
}
