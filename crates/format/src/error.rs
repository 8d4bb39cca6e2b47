//! Formatting error types

use logpress_ewma::WindowError;
use thiserror::Error;

/// Errors that can occur while producing JSON text
///
/// The escaping sink itself never fails on character input, so a
/// failed format call is always encoder-originated (or an invalid
/// estimator window). A failed call updates nothing: the size
/// estimate is only fed on success.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The estimator rejected a decay window
    #[error("invalid average window: {0}")]
    Window(#[from] WindowError),

    /// The JSON encoder rejected the record
    #[error("json encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}
