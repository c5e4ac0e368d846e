use std::{fmt, ops};

use serde::{Deserialize, Serialize};

use crate::{Angle, Distance, Vec2D};

/// A position in the local planar frame, in meters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pt2D {
    x: f64,
    y: f64,
}

impl Pt2D {
    pub fn new(x: f64, y: f64) -> Pt2D {
        if !x.is_finite() || !y.is_finite() {
            panic!("Bad Pt2D {}, {}", x, y);
        }
        Pt2D { x, y }
    }

    pub fn x(self) -> f64 {
        self.x
    }

    pub fn y(self) -> f64 {
        self.y
    }

    pub fn dist_to(self, to: Pt2D) -> Distance {
        Distance::meters((to - self).norm())
    }

    pub fn angle_to(self, to: Pt2D) -> Angle {
        Angle::new_rads((to.y - self.y).atan2(to.x - self.x))
    }

    pub fn project_away(self, dist: Distance, theta: Angle) -> Pt2D {
        self + Vec2D::from_angle(theta) * dist.inner_meters()
    }

    pub fn offset(self, dx: f64, dy: f64) -> Pt2D {
        Pt2D::new(self.x + dx, self.y + dy)
    }

    /// Linear interpolation; `t = 0` is self, `t = 1` is `other`.
    pub fn lerp(self, other: Pt2D, t: f64) -> Pt2D {
        self + (other - self) * t
    }

    pub fn approx_eq(self, other: Pt2D, threshold: Distance) -> bool {
        self.dist_to(other) <= threshold
    }

    /// The average of some points. Panics on an empty slice.
    pub fn center(pts: &[Pt2D]) -> Pt2D {
        if pts.is_empty() {
            panic!("Can't find the center of no points");
        }
        let mut x = 0.0;
        let mut y = 0.0;
        for pt in pts {
            x += pt.x;
            y += pt.y;
        }
        let len = pts.len() as f64;
        Pt2D::new(x / len, y / len)
    }
}

impl fmt::Display for Pt2D {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pt2D({0}, {1})", self.x, self.y)
    }
}

impl ops::Sub for Pt2D {
    type Output = Vec2D;

    fn sub(self, other: Pt2D) -> Vec2D {
        Vec2D::new(self.x - other.x, self.y - other.y)
    }
}

impl ops::Add<Vec2D> for Pt2D {
    type Output = Pt2D;

    fn add(self, v: Vec2D) -> Pt2D {
        Pt2D::new(self.x + v.x, self.y + v.y)
    }
}

impl ops::Sub<Vec2D> for Pt2D {
    type Output = Pt2D;

    fn sub(self, v: Vec2D) -> Pt2D {
        Pt2D::new(self.x - v.x, self.y - v.y)
    }
}
