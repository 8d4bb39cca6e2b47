//! Size-adaptive JSON formatter
//!
//! Serializes a record into 7-bit-clean JSON text while learning how
//! large the output buffer should be. Each call allocates its sink
//! from a time-decayed moving average of the capacities past calls
//! actually grew to, so steady-state formatting avoids repeated buffer
//! growth without pinning a worst-case allocation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use logpress_ewma::{system_ticker, Ticker, TimeWindowMovingAverage};
use serde::Serialize;
use tracing::{debug, trace};

use crate::error::FormatError;
use crate::sink::EscapingSink;

#[cfg(test)]
#[path = "formatter_test.rs"]
mod tests;

/// Granularity the buffer hint is padded to
pub const RND_BUFF_SZ: usize = 16;
/// Seed estimate used before any output size has been observed
pub const MID_BUFF_SZ: usize = 4096;
/// Smallest buffer hint before granularity padding
pub const MIN_BUFF_SZ: usize = MID_BUFF_SZ / 4;
/// Largest buffer hint before granularity padding
pub const MAX_BUFF_SZ: usize = MID_BUFF_SZ * 4;

/// Shortest accepted estimator window
pub const MIN_WINDOW: Duration = Duration::from_millis(1);
/// Estimator window used by [`AdaptiveFormatter::new`]
pub const DEFAULT_WINDOW: Duration = Duration::from_millis(60_000);
/// Longest accepted estimator window
pub const MAX_WINDOW: Duration = Duration::from_millis(3_600_000);

/// The two fixed encoder configurations
///
/// Selection is a copy of this tag; toggling pretty output never
/// rebuilds an encoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonLayout {
    /// Single-line output
    Compact,
    /// Indented multi-line output
    Pretty,
}

impl JsonLayout {
    fn encode<W, T>(self, writer: W, record: &T) -> Result<(), serde_json::Error>
    where
        W: std::io::Write,
        T: Serialize + ?Sized,
    {
        match self {
            Self::Compact => serde_json::to_writer(writer, record),
            Self::Pretty => serde_json::to_writer_pretty(writer, record),
        }
    }
}

/// JSON formatter with a self-tuning buffer-size estimate
///
/// Safe to share across logging threads: the estimator serializes its
/// own mutation, the layout flag is atomic, and every
/// [`format`](Self::format) call owns a private sink.
#[derive(Debug)]
pub struct AdaptiveFormatter {
    pretty: AtomicBool,
    average: TimeWindowMovingAverage,
}

impl AdaptiveFormatter {
    /// Create a compact formatter with the default 60 s estimator window
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    /// Create a formatter with a caller-chosen estimator window
    ///
    /// The window is clamped into `[MIN_WINDOW, MAX_WINDOW]`.
    pub fn with_window(window: Duration) -> Self {
        Self::with_ticker(window, system_ticker())
    }

    /// Create a formatter with an injected millisecond clock
    pub fn with_ticker(window: Duration, ticker: Ticker) -> Self {
        let window = window.clamp(MIN_WINDOW, MAX_WINDOW);
        let average = TimeWindowMovingAverage::with_ticker(window, ticker)
            .expect("window clamped into the valid range");
        average.add(MID_BUFF_SZ as f64);
        Self {
            pretty: AtomicBool::new(false),
            average,
        }
    }

    /// Whether output is currently indented
    pub fn is_pretty(&self) -> bool {
        self.pretty.load(Ordering::Relaxed)
    }

    /// Select compact or indented output
    ///
    /// Idempotent: setting the current value changes nothing.
    pub fn set_pretty(&self, pretty: bool) {
        if self.pretty.swap(pretty, Ordering::Relaxed) != pretty {
            debug!(pretty, "switched json layout");
        }
    }

    fn layout(&self) -> JsonLayout {
        if self.is_pretty() {
            JsonLayout::Pretty
        } else {
            JsonLayout::Compact
        }
    }

    /// Current estimator window
    pub fn average_window(&self) -> Duration {
        self.average.window()
    }

    /// Replace the estimator window, clamped into `[MIN_WINDOW, MAX_WINDOW]`
    ///
    /// When the clamped value differs from the current one, the
    /// estimator restarts under the new decay rate reseeded with the
    /// most recent buffer hint, carrying the size history over instead
    /// of discarding it. Unchanged values are a no-op.
    pub fn set_average_window(&self, window: Duration) -> Result<(), FormatError> {
        let window = window.clamp(MIN_WINDOW, MAX_WINDOW);
        if window != self.average.window() {
            let last = self.buffer_size_hint();
            self.average.reset();
            self.average.set_window(window)?;
            self.average.add(last as f64);
            debug!(
                window_ms = window.as_millis() as u64,
                seed = last,
                "resized estimator window"
            );
        }
        Ok(())
    }

    /// Buffer allocation hint for the next format call
    ///
    /// The current average clamped into `[MIN_BUFF_SZ, MAX_BUFF_SZ]`,
    /// rounded to the nearest integer, then padded by the granularity
    /// rule.
    pub fn buffer_size_hint(&self) -> usize {
        padded_hint(self.average.get_average())
    }

    /// Format one record as a 7-bit-clean JSON string
    ///
    /// On success the sink's final capacity (not the string length) is
    /// fed back into the size estimator. On encoder failure the
    /// estimator is left untouched and no partial output is returned.
    pub fn format<T>(&self, record: &T) -> Result<String, FormatError>
    where
        T: Serialize + ?Sized,
    {
        let hint = self.buffer_size_hint();
        let mut sink = EscapingSink::with_capacity(hint);

        self.layout().encode(&mut sink, record)?;

        let capacity = sink.capacity();
        self.average.add(capacity as f64);
        trace!(hint, capacity, len = sink.len(), "formatted record");

        Ok(sink.into_string())
    }
}

impl Default for AdaptiveFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Pad a clamped average to the estimator's granularity
///
/// The padding adds `n % RND_BUFF_SZ`, which lands on a multiple of
/// the granularity only for already-aligned inputs. Callers depend on
/// the exact arithmetic; see `test_hint_padding_is_not_alignment`
/// before changing it.
fn padded_hint(average: f64) -> usize {
    let clamped = average
        .clamp(MIN_BUFF_SZ as f64, MAX_BUFF_SZ as f64)
        .round() as usize;
    clamped + (clamped % RND_BUFF_SZ)
}
