use std::fmt;

use serde::{Deserialize, Serialize};

use geom::{Angle, Bounds, Distance, Line, Pt2D};
use waypoint_graph::{Boundary, ElementID, LaneID};

pub const BOTTOM_LEFT: usize = 0;
pub const TOP_LEFT: usize = 1;
pub const TOP_RIGHT: usize = 2;
pub const BOTTOM_RIGHT: usize = 3;

/// A quadrilateral tile covering a short stretch of one lane, or of a transition between lanes.
/// "Bottom" is where traffic enters the tile and "top" where it leaves; left and right are
/// relative to that direction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanePolygon {
    /// Position in the synthesized list, which is also traversal order.
    pub poly_id: usize,
    pub start_way: ElementID,
    pub end_way: ElementID,
    pub is_stop: bool,
    pub is_transition: bool,
    /// Anchor polygons are centered on `start_way`, which equals `end_way`.
    pub contains_way: bool,
    pub lane_width: Distance,
    pub left_boundary: Boundary,
    pub right_boundary: Boundary,
    /// Meters per second; 0 when unknown.
    pub speed_max: f64,

    corners: [Pt2D; 4],
    heading: Angle,
    midpoint: Pt2D,
    length: Distance,
}

impl LanePolygon {
    pub fn new(
        poly_id: usize,
        start_way: ElementID,
        end_way: ElementID,
        corners: [Pt2D; 4],
        lane_width: Distance,
    ) -> LanePolygon {
        let mut poly = LanePolygon {
            poly_id,
            start_way,
            end_way,
            is_stop: false,
            is_transition: false,
            contains_way: false,
            lane_width,
            left_boundary: Boundary::Undefined,
            right_boundary: Boundary::Undefined,
            speed_max: 0.0,
            corners,
            heading: Angle::ZERO,
            midpoint: corners[0],
            length: Distance::ZERO,
        };
        poly.set_corners(corners);
        poly
    }

    pub fn corners(&self) -> [Pt2D; 4] {
        self.corners
    }

    pub fn corner(&self, idx: usize) -> Pt2D {
        self.corners[idx]
    }

    /// Replaces the corners and recomputes everything derived from them.
    pub fn set_corners(&mut self, corners: [Pt2D; 4]) {
        self.corners = corners;
        let midline = self.midline();
        self.heading = midline.angle();
        self.length = midline.length();
        self.midpoint = Pt2D::center(&corners);
    }

    /// The direction from the middle of the bottom edge to the middle of the top edge.
    pub fn heading(&self) -> Angle {
        self.heading
    }

    pub fn midpoint(&self) -> Pt2D {
        self.midpoint
    }

    /// Length of the midline.
    pub fn length(&self) -> Distance {
        self.length
    }

    pub fn midline(&self) -> Line {
        Line::new(
            self.corners[BOTTOM_LEFT].lerp(self.corners[BOTTOM_RIGHT], 0.5),
            self.corners[TOP_LEFT].lerp(self.corners[TOP_RIGHT], 0.5),
        )
    }

    /// The 4 sides, going around from the left edge.
    pub fn edges(&self) -> [Line; 4] {
        let c = &self.corners;
        [
            Line::new(c[BOTTOM_LEFT], c[TOP_LEFT]),
            Line::new(c[TOP_LEFT], c[TOP_RIGHT]),
            Line::new(c[TOP_RIGHT], c[BOTTOM_RIGHT]),
            Line::new(c[BOTTOM_RIGHT], c[BOTTOM_LEFT]),
        ]
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::from(&self.corners)
    }

    /// The lane this polygon starts in.
    pub fn lane_id(&self) -> LaneID {
        self.start_way.lane_id()
    }

    /// Belongs to one lane, rather than bridging two.
    pub fn is_lane(&self) -> bool {
        !self.is_transition
    }
}

impl fmt::Display for LanePolygon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "LanePolygon #{} ({} to {})",
            self.poly_id, self.start_way, self.end_way
        )
    }
}
