use std::f64::consts::{PI, TAU};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Wraps any angle in radians into (-pi, pi].
pub fn normalize_radians(rads: f64) -> f64 {
    let mut a = rads % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// An angle in radians, always normalized to (-pi, pi]. 0 points along +x, and angles increase
/// counter-clockwise, so positive means "to the left".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Angle(f64);

impl Angle {
    pub const ZERO: Angle = Angle(0.0);

    pub fn new_rads(rads: f64) -> Angle {
        Angle(normalize_radians(rads))
    }

    pub fn degrees(degs: f64) -> Angle {
        Angle::new_rads(degs.to_radians())
    }

    pub fn radians(self) -> f64 {
        self.0
    }

    pub fn to_degrees(self) -> f64 {
        self.0.to_degrees()
    }

    pub fn opposite(self) -> Angle {
        Angle::new_rads(self.0 + PI)
    }

    pub fn rotate_rads(self, rads: f64) -> Angle {
        Angle::new_rads(self.0 + rads)
    }

    /// How far to turn from `self` to face `other`, in (-pi, pi]. Positive is a left turn.
    pub fn shortest_rotation_towards(self, other: Angle) -> f64 {
        normalize_radians(other.0 - self.0)
    }

    /// True if the two angles differ by no more than `tolerance_rads`, accounting for wraparound.
    pub fn is_within(self, other: Angle, tolerance_rads: f64) -> bool {
        self.shortest_rotation_towards(other).abs() <= tolerance_rads
    }

    pub fn approx_eq(self, other: Angle, within_degrees: f64) -> bool {
        self.is_within(other, within_degrees.to_radians())
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Angle({} degrees)", self.to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_range() {
        for raw in [-10.0, -PI, -PI + 0.001, 0.0, PI, PI + 0.001, 3.0 * PI, 10.0] {
            let a = Angle::new_rads(raw);
            assert!(a.radians() > -PI && a.radians() <= PI, "{} -> {}", raw, a);
        }
        assert_eq!(Angle::new_rads(-PI).radians(), PI);
    }

    #[test]
    fn rotation_wraps() {
        let a = Angle::degrees(170.0);
        let b = Angle::degrees(-170.0);
        assert!((a.shortest_rotation_towards(b) - 20f64.to_radians()).abs() < 1e-9);
        assert!((b.shortest_rotation_towards(a) + 20f64.to_radians()).abs() < 1e-9);
        assert!(a.approx_eq(b, 20.5));
        assert!(!a.approx_eq(b, 19.5));
    }
}
