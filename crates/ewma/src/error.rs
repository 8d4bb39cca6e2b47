//! Moving-average error types

use std::time::Duration;

use thiserror::Error;

/// Errors from decay-window validation
#[derive(Debug, Error)]
pub enum WindowError {
    /// Window shorter than the 1 ms internal resolution
    #[error("window {0:?} is shorter than 1ms")]
    TooShort(Duration),
}
