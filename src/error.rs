//! Error types for the terminal-state engine
//!
//! Malformed protocol input is never an error: the parser drops it and moves
//! on. What remains are API misuse (bad dimensions, out-of-bounds writes) and
//! storage allocation failures, which are fatal to the owning session.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors returned by [`crate::Termpty`] and its building blocks
#[derive(Debug, Error)]
pub enum TermptyError {
    /// Width or height of zero was requested
    #[error("invalid terminal dimensions {width}x{height}: both must be non-zero")]
    InvalidDimensions { width: usize, height: usize },

    /// A cell position outside the active grid was addressed
    #[error("cell ({row}, {col}) is outside the {width}x{height} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        width: usize,
        height: usize,
    },

    /// Grid or backlog storage could not be allocated
    #[error("failed to allocate {what}")]
    Allocation {
        what: &'static str,
        #[source]
        source: TryReserveError,
    },

    /// Configuration rejected by validation
    #[error("invalid configuration: {0}")]
    Config(String),

    /// I/O failure in the headless driver
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot serialization failure in the headless driver
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, TermptyError>;

impl TermptyError {
    pub(crate) fn alloc(what: &'static str, source: TryReserveError) -> Self {
        TermptyError::Allocation { what, source }
    }

    /// True for errors the session cannot recover from
    pub fn is_fatal(&self) -> bool {
        matches!(self, TermptyError::Allocation { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TermptyError::InvalidDimensions {
            width: 0,
            height: 24,
        };
        assert_eq!(
            err.to_string(),
            "invalid terminal dimensions 0x24: both must be non-zero"
        );

        let err = TermptyError::OutOfBounds {
            row: 30,
            col: 2,
            width: 80,
            height: 24,
        };
        assert!(err.to_string().contains("(30, 2)"));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_allocation_is_fatal() {
        let source = Vec::<u8>::new().try_reserve(usize::MAX).unwrap_err();
        let err = TermptyError::alloc("grid rows", source);
        assert!(err.is_fatal());
        assert_eq!(err.to_string(), "failed to allocate grid rows");
    }
}
