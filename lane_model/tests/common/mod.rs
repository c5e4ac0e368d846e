use geom::{Distance, LonLat};
use waypoint_graph::{Boundary, ElementID, Graph, NodeIndex, WayPointEdge, WayPointNode};

/// Builds planar graphs for tests. Edges keep the order they're added in.
pub struct GraphBuilder {
    nodes: Vec<WayPointNode>,
    edges: Vec<(ElementID, ElementID, bool)>,
    stops: Vec<ElementID>,
}

impl GraphBuilder {
    pub fn new() -> GraphBuilder {
        GraphBuilder {
            nodes: Vec::new(),
            edges: Vec::new(),
            stops: Vec::new(),
        }
    }

    /// Adds way-points `seg.lane.1`, `seg.lane.2`, ... joined by lane edges.
    pub fn lane(mut self, seg: u32, lane: u32, pts: &[(f64, f64)]) -> GraphBuilder {
        for (i, (x, y)) in pts.iter().enumerate() {
            let idx = self.nodes.len();
            let id = ElementID::new(seg, lane, i as u32 + 1);
            self.nodes.push(WayPointNode::new(
                id,
                NodeIndex(idx),
                LonLat::new(*x, *y),
                Distance::meters(4.0),
            ));
            if i > 0 {
                self.edges
                    .push((ElementID::new(seg, lane, i as u32), id, false));
            }
        }
        self
    }

    /// The way-points don't have to exist yet.
    pub fn exit(mut self, from: ElementID, to: ElementID) -> GraphBuilder {
        self.edges.push((from, to, true));
        self
    }

    pub fn stop(mut self, way: ElementID) -> GraphBuilder {
        self.stops.push(way);
        self
    }

    /// Coordinates are taken as planar meters, however small the map is. Lane edges are broken
    /// white with a 10m/s limit.
    pub fn build(mut self) -> Graph {
        for way in &self.stops {
            let idx = index(&self.nodes, *way);
            self.nodes[idx.0].is_stop = true;
        }
        let edges = self
            .edges
            .iter()
            .map(|(from, to, is_exit)| {
                let e = WayPointEdge::new(index(&self.nodes, *from), index(&self.nodes, *to));
                if *is_exit {
                    e.exit()
                } else {
                    let mut e = e.with_boundaries(Boundary::BrokenWhite, Boundary::BrokenWhite);
                    e.speed_max = 10.0;
                    e
                }
            })
            .collect();
        let mut graph = Graph::new(self.nodes, edges).unwrap();
        graph.xy_rndf();
        graph
    }
}

fn index(nodes: &[WayPointNode], way: ElementID) -> NodeIndex {
    nodes.iter().find(|n| n.id == way).unwrap().index
}

/// One segment, two lanes heading east, 3 way-points each. Lane 2 is 4m north of lane 1.
pub fn two_lanes() -> Graph {
    GraphBuilder::new()
        .lane(1, 1, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)])
        .lane(1, 2, &[(0.0, 4.0), (10.0, 4.0), (20.0, 4.0)])
        .build()
}
