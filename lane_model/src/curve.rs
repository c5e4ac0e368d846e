use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use geom::{Angle, Distance, Pt2D, Vec2D};

/// How the direction of the curve is chosen at interior points.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TangentMode {
    /// Bisect the incoming and outgoing chords.
    ChordSum,
    /// Follow whichever neighboring chord continues more straightly from the chord beyond it.
    Straightest,
}

/// A composite cubic curve passing through every input point, parameterized by a distance-like
/// "time". Point `k` is reached at `knots()[k]`.
#[derive(Clone, Debug, PartialEq)]
pub struct LaneCurve {
    pts: Vec<Pt2D>,
    knots: Vec<f64>,
    /// Unit direction at each point
    dirs: Vec<Vec2D>,
    /// Bezier control points for the span from point k to k+1
    controls: Vec<[Pt2D; 4]>,
}

impl LaneCurve {
    /// Fits a curve through `pts`, leaving the first point along `start_heading` at
    /// `start_speed` and arriving at the last along `end_heading` at `end_speed`. Speeds that
    /// aren't positive count as 1. Repeated points are fine; they produce zero-length spans.
    pub fn new(
        pts: Vec<Pt2D>,
        start_heading: Angle,
        start_speed: f64,
        end_heading: Angle,
        end_speed: f64,
        mode: TangentMode,
    ) -> Result<LaneCurve> {
        if pts.len() < 2 {
            bail!("a curve needs at least 2 points, not {}", pts.len());
        }
        let n = pts.len();
        let start_speed = if start_speed > 0.0 { start_speed } else { 1.0 };
        let end_speed = if end_speed > 0.0 { end_speed } else { 1.0 };
        let interior_speed = (start_speed + end_speed) / 2.0;

        let mut dirs = Vec::with_capacity(n);
        dirs.push(Vec2D::from_angle(start_heading));
        for i in 1..n - 1 {
            let prev = dirs[i - 1];
            dirs.push(interior_direction(&pts, i, prev, end_heading, mode));
        }
        dirs.push(Vec2D::from_angle(end_heading));

        let speed = |i: usize| {
            if i == 0 {
                start_speed
            } else if i == n - 1 {
                end_speed
            } else {
                interior_speed
            }
        };

        let mut knots = Vec::with_capacity(n);
        let mut controls = Vec::with_capacity(n - 1);
        knots.push(0.0);
        for k in 0..n - 1 {
            let (p0, p1) = (pts[k], pts[k + 1]);
            let dt = span_length(p0, p1, dirs[k], dirs[k + 1]) / ((speed(k) + speed(k + 1)) / 2.0);
            let t0 = dirs[k] * speed(k);
            let t1 = dirs[k + 1] * speed(k + 1);
            controls.push([p0, p0 + t0 * (dt / 3.0), p1 - t1 * (dt / 3.0), p1]);
            knots.push(knots[k] + dt);
        }

        Ok(LaneCurve {
            pts,
            knots,
            dirs,
            controls,
        })
    }

    pub fn points(&self) -> &[Pt2D] {
        &self.pts
    }

    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    pub fn start_time(&self) -> f64 {
        self.knots[0]
    }

    pub fn end_time(&self) -> f64 {
        self.knots[self.knots.len() - 1]
    }

    /// The direction the curve leaves (or arrives at) point `k`.
    pub fn knot_heading(&self, k: usize) -> Angle {
        self.dirs[k].angle()
    }

    /// Times before the first knot or after the last clamp to the first or last point.
    pub fn point(&self, time: f64) -> Pt2D {
        if !(time > self.start_time()) {
            return self.pts[0];
        }
        if time >= self.end_time() {
            return self.pts[self.pts.len() - 1];
        }
        let (span, u) = self.locate(time);
        let [c0, c1, c2, c3] = self.controls[span];
        let (b0, b1, b2, b3) = bernstein(u);
        Pt2D::new(
            b0 * c0.x() + b1 * c1.x() + b2 * c2.x() + b3 * c3.x(),
            b0 * c0.y() + b1 * c1.y() + b2 * c2.y() + b3 * c3.y(),
        )
    }

    /// Velocity with respect to time. Outside the knot range, the velocity at the nearest end.
    pub fn tangent(&self, time: f64) -> Vec2D {
        let (span, u) = if !(time > self.start_time()) {
            match self.first_nonempty_span() {
                Some(span) => (span, 0.0),
                None => return self.dirs[0],
            }
        } else if time >= self.end_time() {
            match self.last_nonempty_span() {
                Some(span) => (span, 1.0),
                None => return self.dirs[self.dirs.len() - 1],
            }
        } else {
            self.locate(time)
        };
        let [c0, c1, c2, c3] = self.controls[span];
        let dt = self.knots[span + 1] - self.knots[span];
        let a = c1 - c0;
        let b = c2 - c1;
        let c = c3 - c2;
        let v = a * (3.0 * (1.0 - u) * (1.0 - u)) + b * (6.0 * u * (1.0 - u)) + c * (3.0 * u * u);
        v / dt
    }

    /// Length of the curve between two times, in either order, by sampling.
    pub fn arc_length(&self, t0: f64, t1: f64) -> Distance {
        let (a, b) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
        let a = a.max(self.start_time());
        let b = b.min(self.end_time());
        if b <= a {
            return Distance::ZERO;
        }
        let steps = 64 * self.controls.len();
        let mut total = Distance::ZERO;
        let mut last = self.point(a);
        for i in 1..=steps {
            let pt = self.point(a + (b - a) * (i as f64) / (steps as f64));
            total += last.dist_to(pt);
            last = pt;
        }
        total
    }

    /// Only call with a time strictly inside the knot range. Returns the span and the
    /// normalized position within it.
    fn locate(&self, time: f64) -> (usize, f64) {
        // Zero-length spans are never selected, since their two knots are equal
        let span = self.knots.partition_point(|k| *k <= time) - 1;
        let (t0, t1) = (self.knots[span], self.knots[span + 1]);
        (span, (time - t0) / (t1 - t0))
    }

    fn first_nonempty_span(&self) -> Option<usize> {
        (0..self.controls.len()).find(|k| self.knots[k + 1] > self.knots[*k])
    }

    fn last_nonempty_span(&self) -> Option<usize> {
        (0..self.controls.len())
            .rev()
            .find(|k| self.knots[k + 1] > self.knots[*k])
    }
}

fn bernstein(u: f64) -> (f64, f64, f64, f64) {
    let v = 1.0 - u;
    (v * v * v, 3.0 * u * v * v, 3.0 * u * u * v, u * u * u)
}

fn chord(pts: &[Pt2D], from: usize, to: usize) -> Option<Vec2D> {
    (pts[to] - pts[from]).normalized()
}

fn interior_direction(
    pts: &[Pt2D],
    i: usize,
    prev_dir: Vec2D,
    end_heading: Angle,
    mode: TangentMode,
) -> Vec2D {
    let incoming = chord(pts, i - 1, i);
    let outgoing = chord(pts, i, i + 1);

    if mode == TangentMode::Straightest {
        if let (Some(incoming), Some(outgoing)) = (incoming, outgoing) {
            let before = if i >= 2 {
                chord(pts, i - 2, i - 1).unwrap_or(prev_dir)
            } else {
                prev_dir
            };
            let after = if i + 2 < pts.len() {
                chord(pts, i + 1, i + 2).unwrap_or(outgoing)
            } else {
                Vec2D::from_angle(end_heading)
            };
            return if incoming.dot(before) >= outgoing.dot(after) {
                incoming
            } else {
                outgoing
            };
        }
    }

    let sum = incoming.unwrap_or(Vec2D::ZERO) + outgoing.unwrap_or(Vec2D::ZERO);
    sum.normalized()
        .or_else(|| chord(pts, i - 1, i + 1))
        .unwrap_or(prev_dir)
}

/// Estimates the length of the curve between two points from the chord and the angle the end
/// tangents make with it, treating the span as roughly a circular arc and splitting the
/// difference with the straight chord.
fn span_length(p0: Pt2D, p1: Pt2D, d0: Vec2D, d1: Vec2D) -> f64 {
    let delta = p1 - p0;
    let c = delta.norm();
    let unit = match delta.normalized() {
        Some(u) => u,
        None => return 0.0,
    };
    let theta0 = unit.dot(d0).clamp(-1.0, 1.0).acos();
    let theta1 = unit.dot(d1).clamp(-1.0, 1.0).acos();
    let theta = ((theta0 + theta1) / 2.0).min(2.0);
    if theta < 1e-6 {
        return c;
    }
    (c + c * theta / theta.sin()) / 2.0
}

#[cfg(test)]
mod tests {
    use std::f64::consts::FRAC_PI_2;

    use super::*;

    fn approx(pt: Pt2D, x: f64, y: f64) -> bool {
        (pt.x() - x).abs() < 1e-6 && (pt.y() - y).abs() < 1e-6
    }

    #[test]
    fn endpoints_are_exact() {
        let pts = vec![
            Pt2D::new(1.0, 2.0),
            Pt2D::new(11.0, 4.0),
            Pt2D::new(19.0, 12.0),
            Pt2D::new(22.5, 25.0),
        ];
        let curve = LaneCurve::new(
            pts.clone(),
            Angle::degrees(10.0),
            2.0,
            Angle::degrees(75.0),
            1.0,
            TangentMode::ChordSum,
        )
        .unwrap();
        assert_eq!(curve.point(curve.start_time()), pts[0]);
        assert_eq!(curve.point(curve.end_time()), pts[3]);
        assert_eq!(curve.point(-100.0), pts[0]);
        assert_eq!(curve.point(curve.end_time() + 100.0), pts[3]);
        for (k, pt) in pts.iter().enumerate() {
            let at = curve.point(curve.knots()[k]);
            assert!(approx(at, pt.x(), pt.y()), "knot {} gave {}", k, at);
        }
    }

    #[test]
    fn straight_line_is_evenly_parameterized() {
        let pts = vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(20.0, 0.0),
        ];
        let curve =
            LaneCurve::new(pts, Angle::ZERO, 1.0, Angle::ZERO, 1.0, TangentMode::ChordSum)
                .unwrap();
        assert!((curve.knots()[1] - 10.0).abs() < 1e-9);
        assert!((curve.end_time() - 20.0).abs() < 1e-9);
        assert!(approx(curve.point(5.0), 5.0, 0.0));
        assert!(approx(curve.point(17.5), 17.5, 0.0));
        let v = curve.tangent(5.0);
        assert!((v.x - 1.0).abs() < 1e-9 && v.y.abs() < 1e-9);
        assert!((curve.arc_length(0.0, 20.0).inner_meters() - 20.0).abs() < 1e-6);
        assert_eq!(curve.arc_length(15.0, 5.0), curve.arc_length(5.0, 15.0));
    }

    #[test]
    fn quarter_circle() {
        let pts: Vec<Pt2D> = (0..=6)
            .map(|i| {
                let theta = (i as f64) * FRAC_PI_2 / 6.0;
                Pt2D::new(10.0 * theta.sin(), 10.0 - 10.0 * theta.cos())
            })
            .collect();
        let curve = LaneCurve::new(
            pts,
            Angle::ZERO,
            1.0,
            Angle::degrees(90.0),
            1.0,
            TangentMode::ChordSum,
        )
        .unwrap();
        let len = curve
            .arc_length(curve.start_time(), curve.end_time())
            .inner_meters();
        assert!((len - 5.0 * std::f64::consts::PI).abs() < 0.3, "{}", len);
        // Halfway through, the curve is still on the circle
        let mid = curve.point(curve.end_time() / 2.0);
        assert!((mid.dist_to(Pt2D::new(0.0, 10.0)).inner_meters() - 10.0).abs() < 0.2);
        assert!(curve.knot_heading(3).approx_eq(Angle::degrees(45.0), 1.0));
    }

    #[test]
    fn tangent_modes() {
        let pts = vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(10.0, 0.0),
            Pt2D::new(20.0, 10.0),
            Pt2D::new(30.0, 20.0),
        ];
        let fit = |mode| {
            LaneCurve::new(
                pts.clone(),
                Angle::ZERO,
                1.0,
                Angle::degrees(45.0),
                1.0,
                mode,
            )
            .unwrap()
        };
        assert!(fit(TangentMode::ChordSum)
            .knot_heading(1)
            .approx_eq(Angle::degrees(22.5), 0.01));
        assert!(fit(TangentMode::Straightest)
            .knot_heading(1)
            .approx_eq(Angle::ZERO, 0.01));
        assert!(fit(TangentMode::Straightest)
            .knot_heading(2)
            .approx_eq(Angle::degrees(45.0), 0.01));
    }

    #[test]
    fn degenerate_input() {
        assert!(LaneCurve::new(
            vec![Pt2D::new(0.0, 0.0)],
            Angle::ZERO,
            1.0,
            Angle::ZERO,
            1.0,
            TangentMode::ChordSum
        )
        .is_err());

        let pts = vec![
            Pt2D::new(0.0, 0.0),
            Pt2D::new(0.0, 0.0),
            Pt2D::new(5.0, 0.0),
        ];
        let curve =
            LaneCurve::new(pts, Angle::ZERO, 0.0, Angle::ZERO, -3.0, TangentMode::ChordSum)
                .unwrap();
        assert_eq!(curve.knots()[0], curve.knots()[1]);
        assert!(approx(curve.point(2.5), 2.5, 0.0));
        let v = curve.tangent(-1.0);
        assert!(v.x.is_finite() && v.y.is_finite());
    }
}
