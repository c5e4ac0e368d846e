//! Dense linear algebra and a generic Kalman measurement update, just big enough for the
//! per-corner filters.

mod filter;
mod matrix;

pub use self::filter::{KalmanFilter, UpdateOptions, UpdateOutcome};
pub use self::matrix::Matrix;
