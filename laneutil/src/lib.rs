//! Small helpers shared by the lane-model crates: logging setup and a phase timer.

#[macro_use]
extern crate log;

pub mod logger;
mod time;

pub use crate::time::{elapsed_seconds, prettyprint_time, prettyprint_usize, Timer};
