use std::ops;

use serde::{Deserialize, Serialize};

use crate::Angle;

/// A displacement in the local frame, in meters. Points are positions; vectors are differences
/// between them, tangents and offsets.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Vec2D {
    pub x: f64,
    pub y: f64,
}

impl Vec2D {
    pub const ZERO: Vec2D = Vec2D { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Vec2D {
        Vec2D { x, y }
    }

    /// A unit vector pointing along `angle`.
    pub fn from_angle(angle: Angle) -> Vec2D {
        let (sin, cos) = angle.radians().sin_cos();
        Vec2D { x: cos, y: sin }
    }

    pub fn dot(self, other: Vec2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// The z component of the 3D cross product. Positive when `other` is counter-clockwise from
    /// `self`.
    pub fn cross(self, other: Vec2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    pub fn norm(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// None for (nearly) zero-length vectors.
    pub fn normalized(self) -> Option<Vec2D> {
        let len = self.norm();
        if len < 1e-9 {
            return None;
        }
        Some(Vec2D::new(self.x / len, self.y / len))
    }

    /// Rotated 90 degrees counter-clockwise.
    pub fn perp_left(self) -> Vec2D {
        Vec2D::new(-self.y, self.x)
    }

    pub fn angle(self) -> Angle {
        Angle::new_rads(self.y.atan2(self.x))
    }
}

impl ops::Add for Vec2D {
    type Output = Vec2D;

    fn add(self, other: Vec2D) -> Vec2D {
        Vec2D::new(self.x + other.x, self.y + other.y)
    }
}

impl ops::Sub for Vec2D {
    type Output = Vec2D;

    fn sub(self, other: Vec2D) -> Vec2D {
        Vec2D::new(self.x - other.x, self.y - other.y)
    }
}

impl ops::Neg for Vec2D {
    type Output = Vec2D;

    fn neg(self) -> Vec2D {
        Vec2D::new(-self.x, -self.y)
    }
}

impl ops::Mul<f64> for Vec2D {
    type Output = Vec2D;

    fn mul(self, scalar: f64) -> Vec2D {
        Vec2D::new(self.x * scalar, self.y * scalar)
    }
}

impl ops::Div<f64> for Vec2D {
    type Output = Vec2D;

    fn div(self, scalar: f64) -> Vec2D {
        Vec2D::new(self.x / scalar, self.y / scalar)
    }
}
