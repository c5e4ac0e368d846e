use std::collections::{BTreeMap, BTreeSet};

use geom::{Angle, Distance, Pt2D};

use crate::{ElementID, Frame, GraphError, LaneID, NodeIndex, WayPointEdge, WayPointNode};

/// Owns the way-points and the edges between them.
#[derive(Clone, Debug)]
pub struct Graph {
    nodes: Vec<WayPointNode>,
    edges: Vec<WayPointEdge>,
    by_id: BTreeMap<ElementID, NodeIndex>,
    pub(crate) frame: Option<Frame>,
}

impl Graph {
    /// Validates the output of a route-network parser. Every node must sit at the position its
    /// index claims, have a unique identity and a positive lane width, and every edge must refer
    /// to existing nodes.
    pub fn new(nodes: Vec<WayPointNode>, edges: Vec<WayPointEdge>) -> Result<Graph, GraphError> {
        let mut by_id = BTreeMap::new();
        for (position, node) in nodes.iter().enumerate() {
            if node.index != NodeIndex(position) {
                return Err(GraphError::IndexMismatch {
                    position,
                    index: node.index,
                });
            }
            let width = node.lane_width.inner_meters();
            if width <= 0.0 {
                return Err(GraphError::BadLaneWidth { id: node.id, width });
            }
            if by_id.insert(node.id, node.index).is_some() {
                return Err(GraphError::DuplicateID { id: node.id });
            }
        }
        for (idx, e) in edges.iter().enumerate() {
            for n in [e.u, e.v] {
                if n.0 >= nodes.len() {
                    return Err(GraphError::DanglingEdge {
                        edge: idx,
                        node: n,
                        num_nodes: nodes.len(),
                    });
                }
            }
        }

        Ok(Graph {
            nodes,
            edges,
            by_id,
            frame: None,
        })
    }

    pub fn nodes(&self) -> &[WayPointNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[WayPointEdge] {
        &self.edges
    }

    pub fn node(&self, idx: NodeIndex) -> &WayPointNode {
        &self.nodes[idx.0]
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<WayPointNode> {
        &mut self.nodes
    }

    pub(crate) fn edges_mut(&mut self) -> &mut Vec<WayPointEdge> {
        &mut self.edges
    }

    /// Which local frame the `map` positions are in, if one has been established yet.
    pub fn frame(&self) -> Option<Frame> {
        self.frame
    }

    pub fn node_by_id(&self, id: ElementID) -> Option<&WayPointNode> {
        self.by_id.get(&id).map(|idx| &self.nodes[idx.0])
    }

    pub fn lane_successor(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.by_id.get(&self.node(idx).id.next_pt()).copied()
    }

    pub fn lane_predecessor(&self, idx: NodeIndex) -> Option<NodeIndex> {
        let prev = self.node(idx).id.prev_pt()?;
        self.by_id.get(&prev).copied()
    }

    /// The local forward direction of the lane at a way-point: towards the next point of the same
    /// lane, or from the previous point if this is the last one. None for a lane with only one
    /// point.
    pub fn lane_heading(&self, idx: NodeIndex) -> Option<Angle> {
        let here = self.node(idx).map;
        if let Some(next) = self.lane_successor(idx) {
            let there = self.node(next).map;
            if here != there {
                return Some(here.angle_to(there));
            }
        }
        let prev = self.node(self.lane_predecessor(idx)?).map;
        if prev == here {
            return None;
        }
        Some(prev.angle_to(here))
    }

    /// Linear scan for the closest way-point passing `filter`. Ties go to the earliest node.
    pub fn nearest_node<F: Fn(&WayPointNode) -> bool>(
        &self,
        pt: Pt2D,
        filter: F,
    ) -> Option<NodeIndex> {
        let mut best: Option<(NodeIndex, Distance)> = None;
        for node in &self.nodes {
            if !filter(node) {
                continue;
            }
            let dist = node.map.dist_to(pt);
            if best.map(|(_, d)| dist < d).unwrap_or(true) {
                best = Some((node.index, dist));
            }
        }
        best.map(|(idx, _)| idx)
    }

    pub fn nearest_in_lane(&self, pt: Pt2D, lane: LaneID) -> Option<NodeIndex> {
        self.nearest_node(pt, |n| n.id.lane_id() == lane)
    }

    pub fn edges_from(&self, idx: NodeIndex) -> impl Iterator<Item = &WayPointEdge> {
        self.edges.iter().filter(move |e| e.u == idx)
    }

    pub fn find_edge(&self, u: NodeIndex, v: NodeIndex) -> Option<&WayPointEdge> {
        self.edges.iter().find(|e| e.u == u && e.v == v)
    }

    /// The edge continuing the lane at `idx`: to its successor if there is one, otherwise the one
    /// arriving from its predecessor.
    pub fn lane_edge_at(&self, idx: NodeIndex) -> Option<&WayPointEdge> {
        if let Some(next) = self.lane_successor(idx) {
            if let Some(e) = self.find_edge(idx, next) {
                return Some(e);
            }
        }
        let prev = self.lane_predecessor(idx)?;
        self.find_edge(prev, idx)
    }

    /// All lane numbers used in a segment.
    pub fn lanes_in_segment(&self, seg: u32) -> BTreeSet<u32> {
        self.nodes
            .iter()
            .filter(|n| n.id.seg == seg)
            .map(|n| n.id.lane)
            .collect()
    }

    /// Recomputes every edge's straight-line length from the current `map` positions.
    pub(crate) fn recalculate_distances(&mut self) {
        for e in &mut self.edges {
            e.distance = self.nodes[e.u.0].map.dist_to(self.nodes[e.v.0].map);
        }
    }
}

#[cfg(test)]
mod tests {
    use geom::LonLat;

    use super::*;

    fn node(seg: u32, lane: u32, pt: u32, index: usize, x: f64, y: f64) -> WayPointNode {
        WayPointNode::new(
            ElementID::new(seg, lane, pt),
            NodeIndex(index),
            LonLat::new(x, y),
            Distance::meters(3.0),
        )
    }

    #[test]
    fn dangling_edges_are_fatal() {
        let nodes = vec![node(1, 1, 1, 0, 0.0, 0.0), node(1, 1, 2, 1, 10.0, 0.0)];
        let edges = vec![
            WayPointEdge::new(NodeIndex(0), NodeIndex(1)),
            WayPointEdge::new(NodeIndex(1), NodeIndex(2)),
        ];
        assert_eq!(
            Graph::new(nodes, edges).unwrap_err(),
            GraphError::DanglingEdge {
                edge: 1,
                node: NodeIndex(2),
                num_nodes: 2
            }
        );
    }

    #[test]
    fn index_must_match_position() {
        let nodes = vec![node(1, 1, 1, 0, 0.0, 0.0), node(1, 1, 2, 5, 10.0, 0.0)];
        assert!(matches!(
            Graph::new(nodes, Vec::new()),
            Err(GraphError::IndexMismatch { position: 1, .. })
        ));
    }

    #[test]
    fn lane_width_must_be_positive() {
        let mut n = node(1, 1, 1, 0, 0.0, 0.0);
        n.lane_width = Distance::ZERO;
        assert!(matches!(
            Graph::new(vec![n], Vec::new()),
            Err(GraphError::BadLaneWidth { .. })
        ));
    }

    #[test]
    fn identities_must_be_unique() {
        let nodes = vec![node(1, 1, 1, 0, 0.0, 0.0), node(1, 1, 1, 1, 10.0, 0.0)];
        assert_eq!(
            Graph::new(nodes, Vec::new()).unwrap_err(),
            GraphError::DuplicateID {
                id: ElementID::new(1, 1, 1)
            }
        );
    }

    #[test]
    fn lookups() {
        let nodes = vec![
            node(1, 1, 1, 0, 0.0, 0.0),
            node(1, 1, 2, 1, 10.0, 0.0),
            node(1, 2, 1, 2, 0.0, 4.0),
            node(1, 4, 1, 3, 0.0, 8.0),
            node(2, 1, 1, 4, 20.0, 0.0),
        ];
        let edges = vec![
            WayPointEdge::new(NodeIndex(0), NodeIndex(1)),
            WayPointEdge::new(NodeIndex(1), NodeIndex(4)).exit(),
            WayPointEdge::new(NodeIndex(1), NodeIndex(2)),
        ];
        let g = Graph::new(nodes, edges).unwrap();

        assert_eq!(
            g.node_by_id(ElementID::new(1, 2, 1)).map(|n| n.index),
            Some(NodeIndex(2))
        );
        assert!(g.node_by_id(ElementID::new(1, 3, 1)).is_none());

        let out: Vec<NodeIndex> = g.edges_from(NodeIndex(1)).map(|e| e.v).collect();
        assert_eq!(out, vec![NodeIndex(4), NodeIndex(2)]);
        assert_eq!(g.edges_from(NodeIndex(4)).count(), 0);

        assert_eq!(
            g.lanes_in_segment(1).into_iter().collect::<Vec<_>>(),
            vec![1, 2, 4]
        );
        assert_eq!(g.lanes_in_segment(2).len(), 1);
        assert!(g.lanes_in_segment(3).is_empty());
    }

    #[test]
    fn lane_neighbors_and_heading() {
        let nodes = vec![
            node(1, 1, 1, 0, 0.0, 0.0),
            node(1, 1, 2, 1, 10.0, 0.0),
            node(1, 1, 3, 2, 10.0, 10.0),
        ];
        let mut g = Graph::new(nodes, Vec::new()).unwrap();
        g.xy_rndf();
        assert_eq!(g.lane_successor(NodeIndex(0)), Some(NodeIndex(1)));
        assert_eq!(g.lane_predecessor(NodeIndex(0)), None);
        assert!(g.lane_heading(NodeIndex(0)).unwrap().approx_eq(Angle::ZERO, 0.01));
        assert!(g
            .lane_heading(NodeIndex(1))
            .unwrap()
            .approx_eq(Angle::degrees(90.0), 0.01));
        // The last point looks back at its predecessor
        assert!(g
            .lane_heading(NodeIndex(2))
            .unwrap()
            .approx_eq(Angle::degrees(90.0), 0.01));
    }

    #[test]
    fn nearest_ties_go_to_first() {
        let nodes = vec![
            node(1, 1, 1, 0, -1.0, 0.0),
            node(1, 1, 2, 1, 1.0, 0.0),
            node(1, 2, 1, 2, 5.0, 5.0),
        ];
        let mut g = Graph::new(nodes, Vec::new()).unwrap();
        g.xy_rndf();
        assert_eq!(
            g.nearest_node(Pt2D::new(0.0, 0.0), |_| true),
            Some(NodeIndex(0))
        );
        assert_eq!(
            g.nearest_in_lane(Pt2D::new(0.0, 0.0), LaneID::new(1, 2)),
            Some(NodeIndex(2))
        );
        assert_eq!(g.nearest_in_lane(Pt2D::new(0.0, 0.0), LaneID::new(1, 3)), None);
    }
}
