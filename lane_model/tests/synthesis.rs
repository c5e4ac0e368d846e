mod common;

use std::f64::consts::PI;

use rand::{Rng, SeedableRng};
use rand_xorshift::XorShiftRng;

use geom::{Angle, Pose, Pt2D};
use lane_model::query::point_in_poly;
use lane_model::{CornerObservation, LaneModel, LaneModelConfig, LanePolygon, TangentMode};
use laneutil::Timer;
use waypoint_graph::{snapshot, Boundary, ElementID, Graph, LaneID};

use common::{two_lanes, GraphBuilder};

fn synthesize(graph: &Graph, config: LaneModelConfig) -> Vec<LanePolygon> {
    LaneModel::new(graph, config, &mut Timer::throwaway())
        .unwrap()
        .polygons()
        .to_vec()
}

fn with_max_poly_size(max_poly_size: f64) -> LaneModelConfig {
    LaneModelConfig {
        max_poly_size,
        ..Default::default()
    }
}

/// Every polygon has 4 distinct corners, turns consistently (so it's a simple, convex
/// quadrilateral), contains its own midpoint, and sits at its own position in the list.
fn check_well_formed(polys: &[LanePolygon]) {
    for (idx, poly) in polys.iter().enumerate() {
        assert_eq!(poly.poly_id, idx);
        let corners = poly.corners();
        for i in 0..4 {
            for j in i + 1..4 {
                assert_ne!(corners[i], corners[j], "{} has repeated corners", poly);
            }
        }
        let turns: Vec<f64> = (0..4)
            .map(|i| {
                let a = corners[i];
                let b = corners[(i + 1) % 4];
                let c = corners[(i + 2) % 4];
                (b - a).cross(c - b)
            })
            .collect();
        assert!(
            turns.iter().all(|t| *t < 0.0) || turns.iter().all(|t| *t > 0.0),
            "{} isn't convex: {:?}",
            poly,
            turns
        );
        let heading = poly.heading().radians();
        assert!(heading > -PI && heading <= PI);
        assert!(point_in_poly(poly, poly.midpoint()), "{}", poly);
    }
}

#[test]
fn straight_two_lane_segment() {
    laneutil::logger::setup();
    let graph = two_lanes();
    let polys = synthesize(&graph, LaneModelConfig::default());
    check_well_formed(&polys);

    // Each lane: 3 anchors, and 4 fill polygons in each of the 2 gaps
    assert_eq!(polys.len(), 22);
    let anchors: Vec<&LanePolygon> = polys.iter().filter(|p| p.contains_way).collect();
    assert_eq!(anchors.len(), 6);
    for (anchor, node) in anchors.iter().zip(graph.nodes()) {
        assert_eq!(anchor.start_way, node.id);
        assert_eq!(anchor.end_way, node.id);
        assert!(anchor.midpoint().approx_eq(node.map, geom::EPSILON_DIST));
        assert!(anchor.heading().approx_eq(Angle::ZERO, 0.001));
    }
    assert!(polys.iter().all(|p| !p.is_transition));
    assert!(polys
        .iter()
        .all(|p| p.left_boundary == Boundary::BrokenWhite && p.speed_max == 10.0));

    // Neighbors in a lane share their edge exactly
    for pair in polys.windows(2) {
        if pair[0].lane_id() == pair[1].lane_id() {
            assert_eq!(pair[0].corner(1), pair[1].corner(0));
            assert_eq!(pair[0].corner(2), pair[1].corner(3));
        }
    }
}

#[test]
fn smaller_polygons_mean_more_of_them() {
    let graph = two_lanes();
    let mut last = 0;
    for max_poly_size in [8.0, 4.0, 2.0, 1.0, 0.5] {
        let count = synthesize(&graph, with_max_poly_size(max_poly_size)).len();
        assert!(count >= last, "{} polygons at {}", count, max_poly_size);
        last = count;
    }
    assert!(last > 22);
}

#[test]
fn transitions_join_segments() {
    let graph = GraphBuilder::new()
        .lane(1, 1, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)])
        .exit(ElementID::new(1, 1, 3), ElementID::new(2, 1, 1))
        .lane(2, 1, &[(30.0, 0.0), (40.0, 0.0), (50.0, 0.0)])
        .build();
    // The exit edge was added between the two lanes' edges
    assert!(graph.edges()[2].is_exit);
    let polys = synthesize(&graph, LaneModelConfig::default());
    check_well_formed(&polys);

    let transitions: Vec<&LanePolygon> = polys.iter().filter(|p| p.is_transition).collect();
    assert_eq!(transitions.len(), 4);
    for t in &transitions {
        assert_eq!(t.start_way, ElementID::new(1, 1, 3));
        assert_eq!(t.end_way, ElementID::new(2, 1, 1));
        assert_eq!(t.left_boundary, Boundary::Undefined);
        assert_eq!(t.right_boundary, Boundary::Undefined);
    }
    // One anchor per way-point, even though the transition and the second lane both use 2.1.1
    assert_eq!(polys.iter().filter(|p| p.contains_way).count(), 6);
    assert_eq!(polys.len(), 26);
    // The transition's anchor comes right after it, before the second lane's fill
    assert!(polys[15].contains_way);
    assert_eq!(polys[15].start_way, ElementID::new(2, 1, 1));
    assert_eq!(polys[14].corner(1), polys[15].corner(0));
}

#[test]
fn mid_lane_entry_keeps_corners_apart() {
    // The exit reaches 2.1.2 before lane 2.1's own edges are walked, so its anchor is emitted
    // right before 2.1.1's
    let graph = GraphBuilder::new()
        .lane(1, 1, &[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)])
        .exit(ElementID::new(1, 1, 3), ElementID::new(2, 1, 2))
        .lane(2, 1, &[(0.0, 12.0), (10.0, 12.0), (20.0, 12.0)])
        .build();
    let mut model = LaneModel::new(&graph, LaneModelConfig::default(), &mut Timer::throwaway())
        .unwrap();
    let anchor_of = |way: ElementID| {
        model
            .polygons()
            .iter()
            .position(|p| p.contains_way && p.start_way == way)
            .unwrap()
    };
    let mid = anchor_of(ElementID::new(2, 1, 2));
    let first = anchor_of(ElementID::new(2, 1, 1));
    assert_eq!(first, mid + 1);

    let observer = Pose::new(Pt2D::new(-30.0, 6.0), Angle::ZERO);
    model.set_current_pose(observer);
    let raw = model.polygons().to_vec();
    let mut glued = 0;
    for poly_id in 0..raw.len() {
        for corner_id in 0..4 {
            let pt = raw[poly_id].corner(corner_id);
            let outcome = model
                .update_poly(CornerObservation {
                    poly_id,
                    corner_id,
                    distance: observer.pt.dist_to(pt).inner_meters(),
                    bearing: observer.bearing_to(pt),
                    confidence: 1.0,
                })
                .unwrap();
            if poly_id == mid {
                assert_ne!(outcome.glued_to, Some(first));
            }
            // Whatever gets glued was synthesized at the same spot
            if let Some(other) = outcome.glued_to {
                glued += 1;
                assert!(raw[other]
                    .corners()
                    .iter()
                    .any(|c| c.approx_eq(pt, geom::EPSILON_DIST)));
            }
        }
    }
    assert!(glued > 0);

    // The two anchors in lane 2.1 haven't been dragged towards each other
    for corner_id in 0..4 {
        for (poly_id, poly) in [(mid, &raw[mid]), (first, &raw[first])] {
            let estimate = model.corner_estimate(poly_id, corner_id).unwrap();
            assert!(estimate.dist_to(poly.corner(corner_id)).inner_meters() < 0.5);
        }
    }
}

#[test]
fn implicit_edges_dont_add_polygons() {
    let mut graph = two_lanes();
    let before = synthesize(&graph, LaneModelConfig::default());
    assert!(graph.find_implicit_edges() > 0);
    assert_eq!(synthesize(&graph, LaneModelConfig::default()), before);
}

#[test]
fn curved_and_random_lanes() {
    // A quarter circle, then a wandering lane
    let arc: Vec<(f64, f64)> = (0..=6)
        .map(|i| {
            let theta = (i as f64) * PI / 12.0;
            (30.0 * theta.sin(), 30.0 - 30.0 * theta.cos())
        })
        .collect();

    let mut rng = XorShiftRng::seed_from_u64(7);
    let mut wander = vec![(0.0, 100.0)];
    let mut heading: f64 = 0.0;
    for _ in 0..12 {
        heading += rng.gen_range(-0.25..0.25);
        let step = rng.gen_range(8.0..14.0);
        let (x, y) = *wander.last().unwrap();
        wander.push((x + step * heading.cos(), y + step * heading.sin()));
    }

    let graph = GraphBuilder::new()
        .lane(1, 1, &arc)
        .lane(2, 1, &wander)
        .build();
    for mode in [TangentMode::ChordSum, TangentMode::Straightest] {
        let config = LaneModelConfig {
            tangent_mode: mode,
            ..Default::default()
        };
        let polys = synthesize(&graph, config);
        check_well_formed(&polys);
        assert_eq!(polys.iter().filter(|p| p.contains_way).count(), 20);
    }

    // Tiling doesn't depend on which way a lane points
    let straight = GraphBuilder::new()
        .lane(1, 1, &[(0.0, 0.0), (20.0, 0.0)])
        .build();
    let bend = GraphBuilder::new()
        .lane(1, 1, &[(0.0, 0.0), (14.142, 14.142)])
        .build();
    assert_eq!(
        synthesize(&straight, LaneModelConfig::default()).len(),
        synthesize(&bend, LaneModelConfig::default()).len()
    );
}

#[test]
fn needs_a_frame() {
    let nodes = two_lanes().nodes().to_vec();
    let edges = two_lanes().edges().to_vec();
    let graph = Graph::new(nodes, edges).unwrap();
    assert!(LaneModel::new(&graph, LaneModelConfig::default(), &mut Timer::throwaway()).is_err());
}

#[test]
fn snapshot_reload_gives_the_same_polygons() {
    let mut graph = GraphBuilder::new()
        .lane(1, 1, &[(0.0, 0.0), (10.0, 1.0), (20.0, 3.0)])
        .lane(1, 2, &[(0.0, 4.0), (10.0, 5.0), (20.0, 7.0)])
        .stop(ElementID::new(1, 1, 3))
        .build();
    graph.find_implicit_edges();

    let mut buf = Vec::new();
    snapshot::write_snapshot(&graph, &mut buf).unwrap();
    let reloaded = snapshot::read_snapshot(&buf[..]).unwrap();
    assert_eq!(
        synthesize(&reloaded, LaneModelConfig::default()),
        synthesize(&graph, LaneModelConfig::default())
    );
}

#[test]
fn drift_correction_from_current_pose() {
    let graph = two_lanes();
    let mut model = LaneModel::new(&graph, LaneModelConfig::default(), &mut Timer::throwaway())
        .unwrap();
    let target = model
        .polygons()
        .iter()
        .position(|p| p.contains_way && p.start_way == ElementID::new(1, 1, 3))
        .unwrap();

    model.set_current_pose(Pose::new(Pt2D::new(-10.0, 0.0), Angle::ZERO));
    assert_eq!(model.update_with_current(target).unwrap(), 4);
    // Observing the synthesized geometry itself leaves it in place
    for (raw, filtered) in model
        .polygons()
        .iter()
        .zip(model.filtered_polygons().iter())
    {
        for i in 0..4 {
            assert!(raw.corner(i).approx_eq(filtered.corner(i), geom::EPSILON_DIST));
        }
        assert_eq!(raw.lane_id(), filtered.lane_id());
    }
    assert_eq!(model.polygons()[target].lane_id(), LaneID::new(1, 1));
}
