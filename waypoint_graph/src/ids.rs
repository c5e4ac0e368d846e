use std::fmt;

use serde::{Deserialize, Serialize};

/// Names a way-point by its position in the route network: segment (or zone), lane (or spot)
/// and point. Perimeter points of a zone use lane 0.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementID {
    pub seg: u32,
    pub lane: u32,
    pub pt: u32,
}

impl ElementID {
    pub fn new(seg: u32, lane: u32, pt: u32) -> ElementID {
        ElementID { seg, lane, pt }
    }

    pub fn lane_id(self) -> LaneID {
        LaneID {
            seg: self.seg,
            lane: self.lane,
        }
    }

    pub fn same_lane(self, other: ElementID) -> bool {
        self.lane_id() == other.lane_id()
    }

    /// The next point along the same lane, by numbering alone.
    pub fn next_pt(self) -> ElementID {
        ElementID::new(self.seg, self.lane, self.pt + 1)
    }

    /// The previous point along the same lane, or None for the first point.
    pub fn prev_pt(self) -> Option<ElementID> {
        if self.pt == 0 {
            return None;
        }
        Some(ElementID::new(self.seg, self.lane, self.pt - 1))
    }
}

impl fmt::Display for ElementID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}.{}", self.seg, self.lane, self.pt)
    }
}

/// A lane (or zone perimeter, or parking spot) within a segment.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneID {
    pub seg: u32,
    pub lane: u32,
}

impl LaneID {
    pub fn new(seg: u32, lane: u32) -> LaneID {
        LaneID { seg, lane }
    }

    /// The lane numbered `delta` away in the same segment. Lanes are numbered from 1, so this is
    /// None when it would leave that range.
    pub fn adjacent(self, delta: i64) -> Option<LaneID> {
        let lane = i64::from(self.lane) + delta;
        if lane < 1 || lane > i64::from(u32::MAX) {
            return None;
        }
        Some(LaneID::new(self.seg, lane as u32))
    }
}

impl fmt::Display for LaneID {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.seg, self.lane)
    }
}

/// A position in the graph's node array. `Graph::new` guarantees that `nodes[i].index ==
/// NodeIndex(i)` and that every edge only refers to existing positions, so indexing the graph
/// with one of these never goes out of bounds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeIndex(pub usize);

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "NodeIndex({})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_lanes() {
        let lane = LaneID::new(3, 1);
        assert_eq!(lane.adjacent(1), Some(LaneID::new(3, 2)));
        assert_eq!(lane.adjacent(-1), None);
        assert_eq!(LaneID::new(3, 2).adjacent(-1), Some(lane));
    }
}
