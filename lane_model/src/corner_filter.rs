use anyhow::{bail, Result};

use geom::{normalize_radians, Angle, Pose, Pt2D, Vec2D};

use crate::kalman::{KalmanFilter, Matrix, UpdateOptions, UpdateOutcome};
use crate::FilterConfig;

/// A Kalman estimate of one polygon corner's position. The state is just (x, y); corners don't
/// move, so there's no process model.
#[derive(Clone, Debug, PartialEq)]
pub struct FilteredCorner {
    kf: KalmanFilter,
}

impl FilteredCorner {
    pub fn new(pt: Pt2D, cfg: &FilterConfig) -> FilteredCorner {
        FilteredCorner {
            kf: fresh_filter(pt, cfg),
        }
    }

    /// Forgets everything learned so far and starts again from `pt`.
    pub fn set_point(&mut self, pt: Pt2D, cfg: &FilterConfig) {
        self.kf = fresh_filter(pt, cfg);
    }

    pub fn point(&self) -> Pt2D {
        let x = self.kf.state();
        Pt2D::new(x.get(0, 0), x.get(1, 0))
    }

    /// The variance along x and y.
    pub fn variance(&self) -> (f64, f64) {
        let p = self.kf.covariance();
        (p.get(0, 0), p.get(1, 1))
    }

    /// Refines the estimate from one sighting: the corner was seen `distance` meters away from
    /// `observer`, at `bearing` relative to the observer's heading. Range and bearing are applied
    /// as two scalar updates, one after the other. Lower `confidence` inflates the measurement
    /// noise.
    pub fn update(
        &mut self,
        observer: Pose,
        distance: f64,
        bearing: Angle,
        confidence: f64,
        cfg: &FilterConfig,
    ) -> Result<(UpdateOutcome, UpdateOutcome)> {
        if !(confidence > 0.0) {
            bail!("observation confidence must be positive, not {}", confidence);
        }
        if !distance.is_finite() {
            bail!("observed distance {} isn't finite", distance);
        }
        let opts = UpdateOptions {
            outlier_sd: cfg.outlier_sd,
            deadzone: cfg.deadzone,
        };

        let range = {
            let (predicted, dir) = self.relative_to(observer, cfg);
            let c = Matrix::from_vec(1, 2, vec![dir.x, dir.y])?;
            let r = Matrix::scalar(distance * distance / cfg.range_noise_divisor / confidence);
            self.kf.measurement_update_extended(
                &c,
                &r,
                &Matrix::scalar(distance.abs()),
                &Matrix::scalar(predicted),
                opts,
            )?
        };
        if range != UpdateOutcome::Success {
            debug!("Range update of corner near {} skipped: {:?}", self.point(), range);
        }

        let bearing_outcome = {
            let (dist, dir) = self.relative_to(observer, cfg);
            let predicted = normalize_radians(dir.angle().radians() - observer.heading.radians());
            let innovation = normalize_radians(bearing.radians() - predicted);
            let jacobian = dir.perp_left() / dist;
            let c = Matrix::from_vec(1, 2, vec![jacobian.x, jacobian.y])?;
            let r = Matrix::scalar(cfg.bearing_variance / confidence);
            // The wrapped difference is fed in directly, so the filter never sees a 2*pi jump.
            self.kf.measurement_update_extended(
                &c,
                &r,
                &Matrix::scalar(innovation),
                &Matrix::scalar(0.0),
                opts,
            )?
        };
        if bearing_outcome != UpdateOutcome::Success {
            debug!(
                "Bearing update of corner near {} skipped: {:?}",
                self.point(),
                bearing_outcome
            );
        }

        Ok((range, bearing_outcome))
    }

    /// Distance from the observer to the current estimate (at least `min_distance`), and the
    /// unit vector pointing there.
    fn relative_to(&self, observer: Pose, cfg: &FilterConfig) -> (f64, Vec2D) {
        let delta = self.point() - observer.pt;
        let dir = delta
            .normalized()
            .unwrap_or_else(|| Vec2D::from_angle(observer.heading));
        (delta.norm().max(cfg.min_distance), dir)
    }
}

fn fresh_filter(pt: Pt2D, cfg: &FilterConfig) -> KalmanFilter {
    KalmanFilter::position(pt.x(), pt.y(), cfg.initial_variance)
}
