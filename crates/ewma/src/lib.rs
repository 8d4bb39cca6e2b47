//! Logpress - EWMA
//!
//! Time-windowed exponential moving average over irregularly spaced
//! samples.
//!
//! # Overview
//!
//! Unlike a fixed-alpha smoother, the decay here is continuous-time:
//! each sample is weighted by how much wall-clock time passed since the
//! previous one. Samples arriving in a burst barely move the average,
//! while a sample landing several windows after the last one dominates
//! it. This makes the average usable for signals with irregular arrival
//! rates, such as per-call buffer sizes in a formatter.
//!
//! # Design Principles
//!
//! - **Serialized mutation**: `add` and `reset` take a single mutex, so
//!   concurrent writers each see a consistent before/after state
//! - **Lock-free reads**: the current value is mirrored into an atomic,
//!   so readers never block writers and never see a torn value
//! - **Pluggable clock**: the millisecond ticker is injectable for
//!   deterministic tests and non-wall-clock time sources

mod average;
mod error;

pub use average::{system_ticker, Ticker, TimeWindowMovingAverage};
pub use error::WindowError;
