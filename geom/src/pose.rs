use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Angle, Pt2D};

/// Where something is and which way it faces.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub pt: Pt2D,
    pub heading: Angle,
}

impl Pose {
    pub fn new(pt: Pt2D, heading: Angle) -> Pose {
        Pose { pt, heading }
    }

    /// The bearing of `target` relative to this pose's heading. Positive means the target is to
    /// the left.
    pub fn bearing_to(self, target: Pt2D) -> Angle {
        Angle::new_rads(
            self.heading
                .shortest_rotation_towards(self.pt.angle_to(target)),
        )
    }

    /// The same position, facing another way.
    pub fn with_heading(self, heading: Angle) -> Pose {
        Pose {
            pt: self.pt,
            heading,
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Pose({}, {})", self.pt, self.heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_sign() {
        let pose = Pose::new(Pt2D::new(0.0, 0.0), Angle::degrees(90.0));
        // Facing north, west is to the left
        assert!(pose.bearing_to(Pt2D::new(-5.0, 1.0)).radians() > 0.0);
        assert!(pose.bearing_to(Pt2D::new(5.0, 1.0)).radians() < 0.0);
        assert!(pose.bearing_to(Pt2D::new(0.0, 10.0)).radians().abs() < 1e-9);
    }
}
