use geom::{Angle, Distance, Pt2D, Vec2D};

/// The corners of a rectangle centered on `center`, `depth` long in the direction of `heading`
/// and `width` across, in the usual [bottom-left, top-left, top-right, bottom-right] order.
pub fn anchor_corners(center: Pt2D, heading: Angle, width: Distance, depth: Distance) -> [Pt2D; 4] {
    let dir = Vec2D::from_angle(heading);
    let forwards = dir * (depth.inner_meters() / 2.0);
    let left = dir.perp_left() * (width.inner_meters() / 2.0);
    [
        center - forwards + left,
        center + forwards + left,
        center + forwards - left,
        center - forwards - left,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_east() {
        let c = anchor_corners(
            Pt2D::new(10.0, 5.0),
            Angle::ZERO,
            Distance::meters(4.0),
            Distance::meters(1.0),
        );
        let expected = [(9.5, 7.0), (10.5, 7.0), (10.5, 3.0), (9.5, 3.0)];
        for (pt, (x, y)) in c.iter().zip(expected) {
            assert!((pt.x() - x).abs() < 1e-9 && (pt.y() - y).abs() < 1e-9, "{}", pt);
        }
    }
}
