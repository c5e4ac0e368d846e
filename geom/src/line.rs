use std::fmt;

use geo::EuclideanDistance;
use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, Pt2D, Vec2D};

/// A line segment. Unlike a polygon edge elsewhere, the two endpoints may coincide; every method
/// copes with zero length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line(Pt2D, Pt2D);

impl Line {
    pub fn new(pt1: Pt2D, pt2: Pt2D) -> Line {
        Line(pt1, pt2)
    }

    pub fn pt1(&self) -> Pt2D {
        self.0
    }

    pub fn pt2(&self) -> Pt2D {
        self.1
    }

    pub fn length(&self) -> Distance {
        self.0.dist_to(self.1)
    }

    pub fn angle(&self) -> Angle {
        self.0.angle_to(self.1)
    }

    pub fn middle(&self) -> Pt2D {
        self.0.lerp(self.1, 0.5)
    }

    fn to_geo(self) -> geo::Line<f64> {
        geo::Line::new((self.0.x(), self.0.y()), (self.1.x(), self.1.y()))
    }

    /// The shortest distance from `pt` to any point on the segment.
    pub fn dist_to_pt(&self, pt: Pt2D) -> Distance {
        Distance::meters(geo::Point::new(pt.x(), pt.y()).euclidean_distance(&self.to_geo()))
    }

    /// Is `pt` on the segment, allowing for some slop?
    pub fn contains_pt(&self, pt: Pt2D, tolerance: Distance) -> bool {
        self.dist_to_pt(pt) <= tolerance
    }

    /// Where `pt` projects onto the infinite line, as a fraction of the segment. 0 is `pt1`, 1 is
    /// `pt2`; values outside [0, 1] fall beyond the ends. A zero-length segment returns 0.
    pub fn percent_along(&self, pt: Pt2D) -> f64 {
        let dir: Vec2D = self.1 - self.0;
        let len_sq = dir.dot(dir);
        if len_sq < 1e-18 {
            return 0.0;
        }
        (pt - self.0).dot(dir) / len_sq
    }

    /// Signed distance along the segment to the projection of `pt`, clamped to the segment.
    pub fn dist_along_of_point(&self, pt: Pt2D) -> Distance {
        self.length() * self.percent_along(pt).clamp(0.0, 1.0)
    }

    /// Follows the segment for `dist`, continuing straight past either end if needed.
    pub fn unbounded_dist_along(&self, dist: Distance) -> Pt2D {
        let len = self.length();
        if len == Distance::ZERO {
            return self.0;
        }
        self.0.lerp(self.1, dist / len)
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Line({}, {})", self.0, self.1)
    }
}
