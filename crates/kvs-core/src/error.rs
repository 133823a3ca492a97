//! # Error Types
//!
//! Top-level error type for the foundational crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.

use thiserror::Error;

/// Top-level error type for core operations.
#[derive(Error, Debug)]
pub enum KvsError {
    /// Wire-format text could not be parsed into a value or record.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A value was well-formed but had the wrong shape for the caller.
    #[error("unexpected value shape: expected {expected}, found {found}")]
    Shape {
        /// Type the caller required.
        expected: &'static str,
        /// Type that was found.
        found: &'static str,
    },

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
