use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use geom::{Distance, LonLat, Pt2D};

use crate::{ElementID, NodeIndex};

/// A point on a lane, zone perimeter or parking spot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WayPointNode {
    pub id: ElementID,
    pub index: NodeIndex,
    pub ll: LonLat,
    /// Position in the graph's local frame. Only meaningful after the frame is established.
    pub map: Pt2D,
    pub lane_width: Distance,

    pub is_entry: bool,
    pub is_exit: bool,
    pub is_goal: bool,
    pub is_lane_change: bool,
    pub is_spot: bool,
    pub is_stop: bool,
    pub is_perimeter: bool,
    /// 0 when this isn't a checkpoint.
    pub checkpoint_id: u32,
}

impl WayPointNode {
    /// A plain lane way-point with no flags set.
    pub fn new(id: ElementID, index: NodeIndex, ll: LonLat, lane_width: Distance) -> WayPointNode {
        WayPointNode {
            id,
            index,
            ll,
            map: Pt2D::new(0.0, 0.0),
            lane_width,
            is_entry: false,
            is_exit: false,
            is_goal: false,
            is_lane_change: false,
            is_spot: false,
            is_stop: false,
            is_perimeter: false,
            checkpoint_id: 0,
        }
    }

    /// Stops, zone perimeters and parking spots don't get lane-change edges.
    pub fn is_special(&self) -> bool {
        self.is_stop || self.is_perimeter || self.is_spot
    }
}

/// The painted line along one side of a lane edge.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub enum Boundary {
    DoubleYellow,
    SolidYellow,
    SolidWhite,
    BrokenWhite,
    Undefined,
}

impl Boundary {
    /// Can a vehicle legally cross this line to change lanes?
    pub fn allows_passing(self) -> bool {
        match self {
            Boundary::DoubleYellow | Boundary::SolidYellow | Boundary::SolidWhite => false,
            Boundary::BrokenWhite | Boundary::Undefined => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Boundary::DoubleYellow => "double_yellow",
            Boundary::SolidYellow => "solid_yellow",
            Boundary::SolidWhite => "solid_white",
            Boundary::BrokenWhite => "broken_white",
            Boundary::Undefined => "undefined",
        }
    }
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Boundary {
    type Err = anyhow::Error;

    fn from_str(x: &str) -> Result<Boundary> {
        Ok(match x {
            "double_yellow" => Boundary::DoubleYellow,
            "solid_yellow" => Boundary::SolidYellow,
            "solid_white" => Boundary::SolidWhite,
            "broken_white" => Boundary::BrokenWhite,
            "undefined" => Boundary::Undefined,
            _ => bail!("unknown boundary marking {}", x),
        })
    }
}

/// A directed connection from `u` to `v`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WayPointEdge {
    pub u: NodeIndex,
    pub v: NodeIndex,
    pub left_boundary: Boundary,
    pub right_boundary: Boundary,
    /// Straight-line length in the local frame. Filled in when the frame is established.
    pub distance: Distance,
    /// Meters per second; 0 when unknown.
    pub speed_min: f64,
    pub speed_max: f64,

    /// Leaves one lane or zone for another.
    pub is_exit: bool,
    /// A lane change inferred from lane adjacency, not present in the route file.
    pub is_implicit: bool,
    pub blocked: bool,
}

impl WayPointEdge {
    pub fn new(u: NodeIndex, v: NodeIndex) -> WayPointEdge {
        WayPointEdge {
            u,
            v,
            left_boundary: Boundary::Undefined,
            right_boundary: Boundary::Undefined,
            distance: Distance::ZERO,
            speed_min: 0.0,
            speed_max: 0.0,
            is_exit: false,
            is_implicit: false,
            blocked: false,
        }
    }

    pub fn with_boundaries(mut self, left: Boundary, right: Boundary) -> WayPointEdge {
        self.left_boundary = left;
        self.right_boundary = right;
        self
    }

    pub fn exit(mut self) -> WayPointEdge {
        self.is_exit = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passing_rules() {
        let allowed: Vec<Boundary> = [
            Boundary::DoubleYellow,
            Boundary::SolidYellow,
            Boundary::SolidWhite,
            Boundary::BrokenWhite,
            Boundary::Undefined,
        ]
        .into_iter()
        .filter(|b| b.allows_passing())
        .collect();
        assert_eq!(allowed, vec![Boundary::BrokenWhite, Boundary::Undefined]);
    }

    #[test]
    fn boundary_names_parse() {
        assert_eq!(
            "solid_white".parse::<Boundary>().unwrap(),
            Boundary::SolidWhite
        );
        assert!("dotted".parse::<Boundary>().is_err());
    }
}
