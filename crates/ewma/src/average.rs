//! Exponentially time-weighted moving average
//!
//! The decay coefficient for each new sample is `exp(-elapsed / window)`
//! where `elapsed` is the wall-clock time since the previous sample.
//! Two samples 1 ms apart barely move the average; two samples ten
//! windows apart make it track the new sample almost entirely.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::Mutex;

use crate::error::WindowError;

#[cfg(test)]
#[path = "average_test.rs"]
mod tests;

/// Millisecond clock used to timestamp samples
pub type Ticker = Arc<dyn Fn() -> u64 + Send + Sync>;

/// Ticker reading the system clock
///
/// Not required to be monotonic; a backwards step decays as zero
/// elapsed time.
pub fn system_ticker() -> Ticker {
    Arc::new(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_millis() as u64)
    })
}

/// Sampled state behind the mutation lock
///
/// `moment: None` is the "unset" sentinel: the next `add` seeds the
/// average instead of decaying into it.
#[derive(Debug, Default)]
struct SampleState {
    moment: Option<u64>,
    value: f64,
}

/// Thread-safe exponentially time-weighted moving average
///
/// Mutation (`add`, `reset`) serializes on one mutex per instance.
/// [`get_average`](Self::get_average) reads a bit-mirrored atomic, so a
/// reader may see a slightly stale value but never a torn one.
pub struct TimeWindowMovingAverage {
    /// Decay window in milliseconds, always >= 1
    window_ms: AtomicU64,

    ticker: Ticker,

    state: Mutex<SampleState>,

    /// Bit pattern of the current value, mirrored for lock-free reads
    value_bits: AtomicU64,
}

impl TimeWindowMovingAverage {
    /// Create an average with the given decay window and the system clock
    pub fn new(window: Duration) -> Result<Self, WindowError> {
        Self::with_ticker(window, system_ticker())
    }

    /// Create an average with a caller-supplied millisecond clock
    pub fn with_ticker(window: Duration, ticker: Ticker) -> Result<Self, WindowError> {
        Ok(Self {
            window_ms: AtomicU64::new(validate_window(window)?),
            ticker,
            state: Mutex::new(SampleState::default()),
            value_bits: AtomicU64::new(0f64.to_bits()),
        })
    }

    /// Current decay window
    pub fn window(&self) -> Duration {
        Duration::from_millis(self.window_ms.load(Ordering::Relaxed))
    }

    /// Replace the decay window
    ///
    /// The current value is not rescaled. A caller that wants the new
    /// window to start from a chosen seed captures the value first,
    /// then calls [`reset`](Self::reset) and adds it back.
    pub fn set_window(&self, window: Duration) -> Result<(), WindowError> {
        self.window_ms
            .store(validate_window(window)?, Ordering::Relaxed);
        Ok(())
    }

    /// Record one observation at the ticker's current instant
    ///
    /// The first call after construction or [`reset`](Self::reset)
    /// seeds the average with the sample itself.
    pub fn add(&self, sample: f64) {
        let now = (self.ticker)();
        let mut state = self.state.lock();

        match state.moment {
            None => state.value = sample,
            Some(prev) => {
                // A clock that stepped backwards decays as zero elapsed
                let elapsed = now.saturating_sub(prev);
                let window = self.window_ms.load(Ordering::Relaxed);
                let coeff = (-(elapsed as f64) / window as f64).exp();
                state.value = (1.0 - coeff) * sample + coeff * state.value;
            }
        }
        state.moment = Some(now);
        self.value_bits.store(state.value.to_bits(), Ordering::Relaxed);
    }

    /// Current average without blocking writers
    ///
    /// Returns the seed sample after exactly one `add`, and 0.0 before
    /// any sample has been recorded.
    pub fn get_average(&self) -> f64 {
        f64::from_bits(self.value_bits.load(Ordering::Relaxed))
    }

    /// Forget all samples; the next `add` reseeds. The window is kept.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.moment = None;
        state.value = 0.0;
        self.value_bits.store(0f64.to_bits(), Ordering::Relaxed);
    }

    /// Average rendered with a fixed number of decimal places
    ///
    /// `places` is capped at 8.
    pub fn to_places(&self, places: usize) -> String {
        format!("{:.*}", places.min(8), self.get_average())
    }
}

impl fmt::Display for TimeWindowMovingAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_places(3))
    }
}

impl fmt::Debug for TimeWindowMovingAverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeWindowMovingAverage")
            .field("window", &self.window())
            .field("value", &self.get_average())
            .finish_non_exhaustive()
    }
}

fn validate_window(window: Duration) -> Result<u64, WindowError> {
    let ms = window.as_millis();
    if ms < 1 {
        return Err(WindowError::TooShort(window));
    }
    Ok(ms.min(u128::from(u64::MAX)) as u64)
}
