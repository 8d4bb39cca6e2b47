//! Logpress - Format
//!
//! Size-adaptive, ASCII-safe JSON formatting for structured log
//! records.
//!
//! # Overview
//!
//! This crate provides:
//! - [`EscapingSink`]: a growable text sink that escapes every
//!   non-ASCII character as `\uXXXX` during the single write pass
//! - [`AdaptiveFormatter`]: serializes a record to JSON through the
//!   sink, learning the right initial buffer size from a time-decayed
//!   moving average of past output sizes
//!
//! # Design Principles
//!
//! - **Allocate once per call**: the buffer hint tracks how large
//!   buffers actually grew, so steady-state formatting avoids repeated
//!   reallocation without pinning a worst-case size
//! - **7-bit clean output**: safe for transports that are not verified
//!   8-bit clean; stronger than the escaping JSON itself requires
//! - **Thread-safe sharing**: one formatter serves many logging
//!   threads; each call owns a private sink
//!
//! # Example
//!
//! ```
//! use logpress_format::AdaptiveFormatter;
//! use serde_json::json;
//!
//! let formatter = AdaptiveFormatter::new();
//! let text = formatter.format(&json!({"msg": "caf\u{e9}"})).unwrap();
//! assert_eq!(text, r#"{"msg":"caf\u00e9"}"#);
//! ```

mod error;
mod formatter;
mod sink;

pub use error::FormatError;
pub use formatter::{
    AdaptiveFormatter, JsonLayout, DEFAULT_WINDOW, MAX_BUFF_SZ, MAX_WINDOW, MID_BUFF_SZ,
    MIN_BUFF_SZ, MIN_WINDOW, RND_BUFF_SZ,
};
pub use sink::EscapingSink;
