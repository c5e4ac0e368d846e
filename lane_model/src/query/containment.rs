use geom::{Distance, Pt2D, EPSILON_DIST};

use crate::LanePolygon;

/// Points this close to a polygon count as inside it.
pub const CONTAIN_EPSILON: Distance = Distance::const_meters(1e-3);

/// Points on the boundary count as inside.
pub fn point_in_poly(poly: &LanePolygon, pt: Pt2D) -> bool {
    if !poly.bounds().contains_with_slop(pt, EPSILON_DIST) {
        return false;
    }
    let edges = poly.edges();
    if edges.iter().any(|l| l.contains_pt(pt, EPSILON_DIST)) {
        return true;
    }

    // Cast a ray towards +x and count crossings
    let mut inside = false;
    for edge in &edges {
        let (a, b) = (edge.pt1(), edge.pt2());
        if (a.y() > pt.y()) != (b.y() > pt.y()) {
            let x = a.x() + (pt.y() - a.y()) * (b.x() - a.x()) / (b.y() - a.y());
            if pt.x() < x {
                inside = !inside;
            }
        }
    }
    inside
}

/// Zero for points inside, otherwise the distance to the nearest side.
pub fn distance_to_poly(poly: &LanePolygon, pt: Pt2D) -> Distance {
    if point_in_poly(poly, pt) {
        return Distance::ZERO;
    }
    poly.edges()
        .iter()
        .map(|l| l.dist_to_pt(pt))
        .min()
        .unwrap_or(Distance::ZERO)
}

/// The polygon nearest to `pt`. Ties go to the earliest polygon. None only for an empty list.
pub fn closest_poly(polys: &[LanePolygon], pt: Pt2D) -> Option<usize> {
    closest_matching(polys, pt, |_| true).map(|(idx, _)| idx)
}

/// Like `closest_poly`, but the point has to be inside (or within `CONTAIN_EPSILON` of) it.
pub fn containing_poly(polys: &[LanePolygon], pt: Pt2D) -> Option<usize> {
    let (idx, dist) = closest_matching(polys, pt, |_| true)?;
    if dist <= CONTAIN_EPSILON {
        Some(idx)
    } else {
        None
    }
}

pub(crate) fn closest_matching<F: Fn(&LanePolygon) -> bool>(
    polys: &[LanePolygon],
    pt: Pt2D,
    filter: F,
) -> Option<(usize, Distance)> {
    let mut best: Option<(usize, Distance)> = None;
    for (idx, poly) in polys.iter().enumerate() {
        if !filter(poly) {
            continue;
        }
        let dist = distance_to_poly(poly, pt);
        if best.map(|(_, d)| dist < d).unwrap_or(true) {
            best = Some((idx, dist));
            if dist == Distance::ZERO {
                break;
            }
        }
    }
    best
}
