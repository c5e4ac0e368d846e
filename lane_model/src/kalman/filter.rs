use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::Matrix;

/// What happened to one measurement update. Shape mismatches are reported separately, as an
/// `Err`, since they mean the caller is broken.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateOutcome {
    Success,
    /// The innovation was implausibly large, so the measurement was ignored.
    OutlierRejected,
    /// The innovation covariance couldn't be inverted, or the result wasn't finite. The state is
    /// left alone.
    NumericsFailure,
}

/// Optional gates applied to each measurement update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateOptions {
    /// Reject when the innovation exceeds this many of its predicted standard deviations.
    pub outlier_sd: Option<f64>,
    /// Ignore innovations smaller than this in every component. The update still reports
    /// success.
    pub deadzone: Option<f64>,
}

/// State mean X (n x 1) and covariance P (n x n). There's no process model; callers that need
/// one can adjust the state and covariance directly between updates.
#[derive(Clone, Debug, PartialEq)]
pub struct KalmanFilter {
    x: Matrix,
    p: Matrix,
}

impl KalmanFilter {
    pub fn new(x: Matrix, p: Matrix) -> Result<KalmanFilter> {
        if x.cols() != 1 || p.rows() != x.rows() || p.cols() != x.rows() {
            bail!(
                "state is {}x{}, but covariance is {}x{}",
                x.rows(),
                x.cols(),
                p.rows(),
                p.cols()
            );
        }
        Ok(KalmanFilter { x, p })
    }

    /// A 2D position estimate with the same variance on both axes and no correlation.
    pub(crate) fn position(x: f64, y: f64, variance: f64) -> KalmanFilter {
        KalmanFilter {
            x: Matrix::column(&[x, y]),
            p: &Matrix::identity(2) * variance,
        }
    }

    pub fn state(&self) -> &Matrix {
        &self.x
    }

    pub fn covariance(&self) -> &Matrix {
        &self.p
    }

    pub fn set_state(&mut self, x: Matrix) -> Result<()> {
        if !x.same_shape(&self.x) {
            bail!("new state is {}x{}", x.rows(), x.cols());
        }
        self.x = x;
        Ok(())
    }

    pub fn set_covariance(&mut self, p: Matrix) -> Result<()> {
        if !p.same_shape(&self.p) {
            bail!("new covariance is {}x{}", p.rows(), p.cols());
        }
        self.p = p;
        Ok(())
    }

    /// An extended-filter measurement update. `c` (m x n) is the measurement Jacobian at the
    /// current estimate, `r` (m x m) the measurement noise, `y` the observation and `ybar` the
    /// observation predicted from the current estimate. Only m of 1 or 2 is supported.
    pub fn measurement_update_extended(
        &mut self,
        c: &Matrix,
        r: &Matrix,
        y: &Matrix,
        ybar: &Matrix,
        opts: UpdateOptions,
    ) -> Result<UpdateOutcome> {
        let n = self.x.rows();
        let m = y.rows();
        if c.rows() != m || c.cols() != n {
            bail!("Jacobian is {}x{}, expected {}x{}", c.rows(), c.cols(), m, n);
        }
        if r.rows() != m || r.cols() != m {
            bail!("noise is {}x{}, expected {}x{}", r.rows(), r.cols(), m, m);
        }
        if y.cols() != 1 || !y.same_shape(ybar) {
            bail!(
                "observation is {}x{} but prediction is {}x{}",
                y.rows(),
                y.cols(),
                ybar.rows(),
                ybar.cols()
            );
        }
        if m == 0 || m > 2 {
            bail!("{} simultaneous measurements aren't supported", m);
        }

        let innovation = y - ybar;
        let ct = c.transpose();
        let s = &(&(c * &self.p) * &ct) + r;
        let s_inv = match s.inverse() {
            Some(inv) => inv,
            None => return Ok(UpdateOutcome::NumericsFailure),
        };

        if let Some(sd) = opts.outlier_sd {
            let mahalanobis_sq = (&(&innovation.transpose() * &s_inv) * &innovation).get(0, 0);
            if !mahalanobis_sq.is_finite() {
                return Ok(UpdateOutcome::NumericsFailure);
            }
            if mahalanobis_sq > sd * sd {
                return Ok(UpdateOutcome::OutlierRejected);
            }
        }
        if let Some(deadzone) = opts.deadzone {
            if (0..m).all(|i| innovation.get(i, 0).abs() < deadzone) {
                return Ok(UpdateOutcome::Success);
            }
        }

        let gain = &(&self.p * &ct) * &s_inv;
        let x = &self.x + &(&gain * &innovation);

        // Joseph form keeps P positive semi-definite despite rounding
        let i_kc = &Matrix::identity(n) - &(&gain * c);
        let p = &(&(&i_kc * &self.p) * &i_kc.transpose()) + &(&(&gain * r) * &gain.transpose());
        let p = p.symmetrized();

        if !x.is_finite() || !p.is_finite() {
            return Ok(UpdateOutcome::NumericsFailure);
        }
        self.x = x;
        self.p = p;
        Ok(UpdateOutcome::Success)
    }
}
