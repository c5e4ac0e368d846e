use std::collections::BTreeSet;
use std::f64::consts::FRAC_PI_2;

use geom::{Pose, Vec2D};

use crate::{Graph, NodeIndex, WayPointEdge};

impl Graph {
    /// Infers lane-change edges between neighboring lanes of the same segment. Any implicit edges
    /// from a previous call are replaced, so running this twice yields the same graph. Returns
    /// the number of edges added.
    ///
    /// From every ordinary way-point, look for the closest way-point in the lane numbered one
    /// lower and one higher. A lane change is allowed when both lanes point the same way (within
    /// 90 degrees) and the marking between them, on the edge continuing the lane from the
    /// starting way-point, permits passing.
    pub fn find_implicit_edges(&mut self) -> usize {
        self.edges_mut().retain(|e| !e.is_implicit);

        let mut existing: BTreeSet<(NodeIndex, NodeIndex)> =
            self.edges().iter().map(|e| (e.u, e.v)).collect();
        let mut new_edges = Vec::new();

        for node in self.nodes() {
            if node.is_special() {
                continue;
            }
            let heading = match self.lane_heading(node.index) {
                Some(h) => h,
                None => continue,
            };
            let lane_edge = match self.lane_edge_at(node.index) {
                Some(e) => e,
                None => continue,
            };

            for delta in [-1, 1] {
                let other_lane = match node.id.lane_id().adjacent(delta) {
                    Some(l) => l,
                    None => continue,
                };
                let mut target = match self.nearest_in_lane(node.map, other_lane) {
                    Some(idx) => idx,
                    None => continue,
                };
                if self.node(target).is_perimeter || self.node(target).is_spot {
                    continue;
                }
                let other_heading = match self.lane_heading(target) {
                    Some(h) => h,
                    None => continue,
                };
                if heading.shortest_rotation_towards(other_heading).abs() >= FRAC_PI_2 {
                    continue;
                }

                // Changing lanes backwards makes no sense; aim for the next point ahead instead.
                let forwards = Vec2D::from_angle(heading);
                if (self.node(target).map - node.map).dot(forwards) < 0.0 {
                    if let Some(next) = self.lane_successor(target) {
                        target = next;
                    }
                }

                let to_left = Pose::new(node.map, heading)
                    .bearing_to(self.node(target).map)
                    .radians()
                    > 0.0;
                let marking = if to_left {
                    lane_edge.left_boundary
                } else {
                    lane_edge.right_boundary
                };
                if !marking.allows_passing() {
                    continue;
                }

                if !existing.insert((node.index, target)) {
                    continue;
                }
                let mut e = WayPointEdge::new(node.index, target);
                e.distance = node.map.dist_to(self.node(target).map);
                e.speed_min = lane_edge.speed_min;
                e.speed_max = lane_edge.speed_max;
                e.is_implicit = true;
                new_edges.push(e);
            }
        }

        let count = new_edges.len();
        info!("Inferred {} implicit lane-change edges", count);
        self.edges_mut().extend(new_edges);
        count
    }
}
