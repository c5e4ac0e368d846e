//! Turns a way-point graph into an ordered list of lane polygons.
//!
//! Edges are walked in order. Consecutive edges along one lane are buffered into a run; any other
//! edge (an exit, a zone crossing, anything touching a perimeter or parking spot) is a
//! transition. Whenever the kind of edge changes, the buffered run is fit with a curve and tiled:
//! one anchor polygon centered on each way-point, with fill polygons between neighboring anchors.

mod anchor;
mod fill;

use std::collections::BTreeMap;

use anyhow::{bail, Result};

use geom::{Angle, Distance, Pt2D};
use laneutil::{prettyprint_usize, Timer};
use waypoint_graph::{Boundary, Graph, NodeIndex, WayPointEdge};

pub use self::anchor::anchor_corners;
pub use self::fill::{span_is_flat, subdivide};
use crate::polygon::{BOTTOM_LEFT, BOTTOM_RIGHT, TOP_LEFT, TOP_RIGHT};
use crate::{LaneCurve, LaneModelConfig, LanePolygon, TangentMode};

/// Tiles every lane and transition of the graph. The graph's local frame must already be
/// established.
pub fn synthesize(
    graph: &Graph,
    config: &LaneModelConfig,
    timer: &mut Timer,
) -> Result<Vec<LanePolygon>> {
    if graph.frame().is_none() {
        bail!("establish the graph's local frame before making polygons");
    }
    if !(config.max_poly_size > 0.0) || !(config.anchor_depth > 0.0) {
        bail!(
            "max_poly_size {} and anchor_depth {} must be positive",
            config.max_poly_size,
            config.anchor_depth
        );
    }

    timer.start("synthesize lane polygons");
    let mut synth = Synthesizer {
        graph,
        config,
        polys: Vec::new(),
        anchors: BTreeMap::new(),
        num_lane_runs: 0,
        num_transitions: 0,
    };

    let mut run: Vec<usize> = Vec::new();
    timer.start_iter("walk edges", graph.edges().len());
    for (idx, e) in graph.edges().iter().enumerate() {
        timer.next();
        // Lane changes are implied by the adjacent lanes' polygons
        if e.is_implicit {
            continue;
        }
        if synth.is_lane_edge(e) {
            let continues = run
                .last()
                .map(|last| {
                    let prev = &graph.edges()[*last];
                    prev.v == e.u && graph.node(prev.v).id.same_lane(graph.node(e.v).id)
                })
                .unwrap_or(true);
            if !continues {
                synth.lane_run(&run)?;
                run.clear();
            }
            run.push(idx);
        } else {
            synth.lane_run(&run)?;
            run.clear();
            synth.transition(e)?;
        }
    }
    synth.lane_run(&run)?;

    timer.note(format!(
        "{} polygons from {} lane runs and {} transitions",
        prettyprint_usize(synth.polys.len()),
        prettyprint_usize(synth.num_lane_runs),
        prettyprint_usize(synth.num_transitions)
    ));
    timer.stop("synthesize lane polygons");
    Ok(synth.polys)
}

struct Synthesizer<'a> {
    graph: &'a Graph,
    config: &'a LaneModelConfig,
    polys: Vec<LanePolygon>,
    /// Each way-point gets at most one anchor, indexing into `polys`
    anchors: BTreeMap<NodeIndex, usize>,
    num_lane_runs: usize,
    num_transitions: usize,
}

impl<'a> Synthesizer<'a> {
    /// Runs between two way-points of the same lane.
    fn is_lane_edge(&self, e: &WayPointEdge) -> bool {
        let u = self.graph.node(e.u);
        let v = self.graph.node(e.v);
        !e.is_exit
            && u.id.same_lane(v.id)
            && !u.is_perimeter
            && !v.is_perimeter
            && !u.is_spot
            && !v.is_spot
    }

    fn lane_run(&mut self, run: &[usize]) -> Result<()> {
        if run.is_empty() {
            return Ok(());
        }
        self.num_lane_runs += 1;
        let graph = self.graph;
        let edges: Vec<&WayPointEdge> = run.iter().map(|idx| &graph.edges()[*idx]).collect();
        let mut nodes = vec![edges[0].u];
        nodes.extend(edges.iter().map(|e| e.v));
        let pts: Vec<Pt2D> = nodes.iter().map(|n| graph.node(*n).map).collect();

        let start_heading = chord_heading(pts[0], pts[1]);
        let end_heading = chord_heading(pts[pts.len() - 2], pts[pts.len() - 1]);
        let curve = LaneCurve::new(
            pts,
            start_heading,
            1.0,
            end_heading,
            1.0,
            self.config.tangent_mode,
        )?;

        let half_depth = self.config.anchor_depth / 2.0;
        let mut prev: Option<LanePolygon> = None;
        for (k, node) in nodes.iter().enumerate() {
            // The last way-point's anchor takes its markings from the edge arriving there
            let edge = edges[k.min(edges.len() - 1)];
            let (anchor, is_new) = self.anchor(*node, curve.knot_heading(k), edge);
            if let Some(prev) = prev {
                let span = (curve.knots()[k] - half_depth) - (curve.knots()[k - 1] + half_depth);
                self.fill(&prev, &anchor, span, edges[k - 1], false)?;
            }
            if is_new {
                self.emit_anchor(*node, anchor.clone());
            }
            prev = Some(anchor);
        }
        Ok(())
    }

    fn transition(&mut self, e: &WayPointEdge) -> Result<()> {
        if e.u == e.v {
            return Ok(());
        }
        self.num_transitions += 1;
        let from = self.graph.node(e.u).map;
        let to = self.graph.node(e.v).map;
        let chord = chord_heading(from, to);

        let (start, start_is_new) = self.anchor(e.u, self.way_heading(e.u, chord), e);
        if start_is_new {
            self.emit_anchor(e.u, start.clone());
        }
        let (end, end_is_new) = self.anchor(e.v, self.way_heading(e.v, chord), e);

        // The center curve leaves and arrives the way the anchors face
        let curve = LaneCurve::new(
            vec![from, to],
            start.heading(),
            1.0,
            end.heading(),
            1.0,
            TangentMode::ChordSum,
        )?;
        let span = curve.end_time() - curve.start_time() - self.config.anchor_depth;
        self.fill(&start, &end, span, e, true)?;

        if end_is_new {
            self.emit_anchor(e.v, end);
        }
        Ok(())
    }

    /// Which way an anchor at a transition endpoint should face. Lane way-points follow their
    /// lane; zone perimeter points and parking spots just follow the transition.
    fn way_heading(&self, idx: NodeIndex, fallback: Angle) -> Angle {
        let node = self.graph.node(idx);
        if node.is_perimeter || node.is_spot {
            return fallback;
        }
        self.graph.lane_heading(idx).unwrap_or(fallback)
    }

    /// The existing anchor for a way-point, or a new one that hasn't been emitted yet. The bool
    /// is true for a new one.
    fn anchor(&self, idx: NodeIndex, heading: Angle, edge: &WayPointEdge) -> (LanePolygon, bool) {
        if let Some(existing) = self.anchors.get(&idx) {
            return (self.polys[*existing].clone(), false);
        }
        let node = self.graph.node(idx);
        let corners = anchor_corners(
            node.map,
            heading,
            node.lane_width,
            Distance::meters(self.config.anchor_depth),
        );
        let mut poly = LanePolygon::new(0, node.id, node.id, corners, node.lane_width);
        poly.contains_way = true;
        poly.is_stop = node.is_stop;
        poly.left_boundary = edge.left_boundary;
        poly.right_boundary = edge.right_boundary;
        poly.speed_max = edge.speed_max;
        (poly, true)
    }

    fn emit_anchor(&mut self, idx: NodeIndex, mut poly: LanePolygon) {
        poly.poly_id = self.polys.len();
        self.anchors.insert(idx, poly.poly_id);
        self.polys.push(poly);
    }

    /// Tiles the gap between the top edge of anchor `a` and the bottom edge of anchor `b`.
    /// `span` is how much of the center curve's parameter the gap covers.
    fn fill(
        &mut self,
        a: &LanePolygon,
        b: &LanePolygon,
        span: f64,
        edge: &WayPointEdge,
        is_transition: bool,
    ) -> Result<()> {
        if span <= self.config.min_fill_span {
            debug!("No room to fill between {} and {}", a.start_way, b.start_way);
            return Ok(());
        }
        let side = |from: usize, to: usize| {
            LaneCurve::new(
                vec![a.corner(from), b.corner(to)],
                a.heading(),
                1.0,
                b.heading(),
                1.0,
                TangentMode::ChordSum,
            )
        };
        let left = side(TOP_LEFT, BOTTOM_LEFT)?;
        let right = side(TOP_RIGHT, BOTTOM_RIGHT)?;
        let at = |curve: &LaneCurve, s: f64| {
            curve.point(curve.start_time() + s * (curve.end_time() - curve.start_time()))
        };
        let mid = |s: f64| at(&left, s).lerp(at(&right, s), 0.5);

        let max_poly_size = self.config.max_poly_size;
        let pieces = subdivide(|s0, s1| {
            span_is_flat(
                span * (s1 - s0),
                mid(s0).dist_to(mid(s1)).inner_meters(),
                max_poly_size,
            )
        });

        let width = (a.lane_width + b.lane_width) / 2.0;
        let (left_boundary, right_boundary) = if is_transition {
            (Boundary::Undefined, Boundary::Undefined)
        } else {
            (edge.left_boundary, edge.right_boundary)
        };
        for (s0, s1) in pieces {
            let corners = [
                at(&left, s0),
                at(&left, s1),
                at(&right, s1),
                at(&right, s0),
            ];
            let mut poly =
                LanePolygon::new(self.polys.len(), a.start_way, b.start_way, corners, width);
            poly.is_transition = is_transition;
            poly.left_boundary = left_boundary;
            poly.right_boundary = right_boundary;
            poly.speed_max = edge.speed_max;
            self.polys.push(poly);
        }
        Ok(())
    }
}

fn chord_heading(from: Pt2D, to: Pt2D) -> Angle {
    if from == to {
        return Angle::ZERO;
    }
    from.angle_to(to)
}
