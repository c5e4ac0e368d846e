use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use geom::{Angle, Pose, Pt2D, EPSILON_DIST};
use laneutil::Timer;
use waypoint_graph::Graph;

use crate::kalman::UpdateOutcome;
use crate::polygon::{BOTTOM_LEFT, BOTTOM_RIGHT, TOP_LEFT, TOP_RIGHT};
use crate::{make, FilteredCorner, LaneModelConfig, LanePolygon};

/// One sighting of a polygon corner, relative to the current vehicle pose.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerObservation {
    pub poly_id: usize,
    /// 0 to 3, in [bottom-left, top-left, top-right, bottom-right] order
    pub corner_id: usize,
    pub distance: f64,
    pub bearing: Angle,
    /// In (0, 1]; lower values trust the observation less.
    pub confidence: f64,
}

/// What one corner observation did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerOutcome {
    pub range: UpdateOutcome,
    pub bearing: UpdateOutcome,
    /// The polygon whose coincident corner was updated as well, if any.
    pub glued_to: Option<usize>,
}

/// The synthesized lane polygons, plus a position estimate for every corner that can be refined
/// from observations made while driving.
pub struct LaneModel {
    config: LaneModelConfig,
    polys: Vec<LanePolygon>,
    filters: Vec<[FilteredCorner; 4]>,
    current_pose: Option<Pose>,
}

impl LaneModel {
    pub fn new(graph: &Graph, config: LaneModelConfig, timer: &mut Timer) -> Result<LaneModel> {
        let polys = make::synthesize(graph, &config, timer)?;
        info!("Lane model has {} polygons", polys.len());
        Ok(LaneModel::from_polygons(polys, config))
    }

    /// Wraps polygons produced elsewhere. They must already be in traversal order, with `poly_id`
    /// matching their position.
    pub fn from_polygons(polys: Vec<LanePolygon>, config: LaneModelConfig) -> LaneModel {
        let filters = polys
            .iter()
            .map(|p| p.corners().map(|pt| FilteredCorner::new(pt, &config.filter)))
            .collect();
        LaneModel {
            config,
            polys,
            filters,
            current_pose: None,
        }
    }

    pub fn config(&self) -> &LaneModelConfig {
        &self.config
    }

    /// The polygons as synthesized, ignoring any observations.
    pub fn polygons(&self) -> &[LanePolygon] {
        &self.polys
    }

    /// The polygons with every corner moved to its filtered estimate.
    pub fn filtered_polygons(&self) -> Vec<LanePolygon> {
        self.polys
            .iter()
            .zip(&self.filters)
            .map(|(poly, corners)| {
                let mut poly = poly.clone();
                poly.set_corners([
                    corners[0].point(),
                    corners[1].point(),
                    corners[2].point(),
                    corners[3].point(),
                ]);
                poly
            })
            .collect()
    }

    pub fn current_pose(&self) -> Option<Pose> {
        self.current_pose
    }

    /// Observations are relative to this pose.
    pub fn set_current_pose(&mut self, pose: Pose) {
        self.current_pose = Some(pose);
    }

    /// Throws away everything learned from observations.
    pub fn reset_filters(&mut self) {
        for (poly, corners) in self.polys.iter().zip(self.filters.iter_mut()) {
            for (idx, corner) in corners.iter_mut().enumerate() {
                corner.set_point(poly.corner(idx), &self.config.filter);
            }
        }
    }

    /// Overrides one corner's estimate.
    pub fn set_corner(&mut self, poly_id: usize, corner_id: usize, pt: Pt2D) -> Result<()> {
        self.check_ids(poly_id, corner_id)?;
        self.filters[poly_id][corner_id].set_point(pt, &self.config.filter);
        Ok(())
    }

    pub fn corner_estimate(&self, poly_id: usize, corner_id: usize) -> Option<Pt2D> {
        Some(self.filters.get(poly_id)?.get(corner_id)?.point())
    }

    /// Feeds one corner observation, made from the current pose, into that corner's filter. When
    /// the corner sits on the boundary between an anchor and its neighbor in the same lane, the
    /// neighbor's matching corner gets the same observation, so the two stay joined.
    pub fn update_poly(&mut self, obs: CornerObservation) -> Result<CornerOutcome> {
        self.check_ids(obs.poly_id, obs.corner_id)?;
        let observer = match self.current_pose {
            Some(pose) => pose,
            None => bail!("set the current pose before updating polygon corners"),
        };

        let (range, bearing) = self.filters[obs.poly_id][obs.corner_id].update(
            observer,
            obs.distance,
            obs.bearing,
            obs.confidence,
            &self.config.filter,
        )?;

        let glued_to = self.twin_corner(obs.poly_id, obs.corner_id);
        if let Some((twin_poly, twin_corner)) = glued_to {
            self.filters[twin_poly][twin_corner].update(
                observer,
                obs.distance,
                obs.bearing,
                obs.confidence,
                &self.config.filter,
            )?;
        }

        Ok(CornerOutcome {
            range,
            bearing,
            glued_to: glued_to.map(|(poly, _)| poly),
        })
    }

    /// Observes every corner of one polygon from the current pose, using the synthesized geometry
    /// as the measurement. Corners too close, too far, or too far off to the side are skipped.
    /// Returns how many corners were updated.
    pub fn update_with_current(&mut self, poly_id: usize) -> Result<usize> {
        let observer = match self.current_pose {
            Some(pose) => pose,
            None => bail!("set the current pose before updating polygon corners"),
        };
        let poly = match self.polys.get(poly_id) {
            Some(p) => p,
            None => bail!("no polygon {}; there are {}", poly_id, self.polys.len()),
        };
        let gate = &self.config.current_pose_update;

        let mut observations = Vec::new();
        for (corner_id, pt) in poly.corners().into_iter().enumerate() {
            let distance = observer.pt.dist_to(pt).inner_meters();
            let bearing = observer.bearing_to(pt);
            if distance < gate.min_range
                || distance > gate.max_range
                || bearing.radians().abs() > gate.max_bearing
            {
                continue;
            }
            observations.push(CornerObservation {
                poly_id,
                corner_id,
                distance,
                bearing,
                confidence: 1.0,
            });
        }

        let count = observations.len();
        for obs in observations {
            self.update_poly(obs)?;
        }
        Ok(count)
    }

    /// The corner coinciding with this one in the neighboring polygon of the same lane, when one
    /// of the pair is an anchor. Bottom corners join the previous polygon's top, and top corners
    /// join the next polygon's bottom, but only if the synthesized corners really coincide.
    fn twin_corner(&self, poly_id: usize, corner_id: usize) -> Option<(usize, usize)> {
        let (other, other_corner) = match corner_id {
            BOTTOM_LEFT => (poly_id.checked_sub(1)?, TOP_LEFT),
            BOTTOM_RIGHT => (poly_id.checked_sub(1)?, TOP_RIGHT),
            TOP_LEFT => (poly_id + 1, BOTTOM_LEFT),
            TOP_RIGHT => (poly_id + 1, BOTTOM_RIGHT),
            _ => return None,
        };
        let here = &self.polys[poly_id];
        let there = self.polys.get(other)?;
        if here.is_transition || there.is_transition {
            return None;
        }
        if here.lane_id() != there.lane_id() || !(here.contains_way || there.contains_way) {
            return None;
        }
        // Anchors emitted early by a transition can land next to an unrelated anchor of the
        // same lane.
        if !here
            .corner(corner_id)
            .approx_eq(there.corner(other_corner), EPSILON_DIST)
        {
            return None;
        }
        Some((other, other_corner))
    }

    fn check_ids(&self, poly_id: usize, corner_id: usize) -> Result<()> {
        if poly_id >= self.polys.len() {
            bail!("no polygon {}; there are {}", poly_id, self.polys.len());
        }
        if corner_id > 3 {
            bail!("corner {} doesn't exist; use 0 through 3", corner_id);
        }
        Ok(())
    }
}
