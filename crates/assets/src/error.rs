//! Asset Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. The storage error that caused a load
//! failure is kept as a child in the error tree for diagnostics.

use derive_more::{Display, Error};

/// An asset error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for asset operations.
pub type Result<T> = std::result::Result<T, Error>;
/// Failure of a whole load; see [`load_assets`](crate::load_assets).
pub type LoadError = Error;

/// Message shown to end users whenever a load fails, whatever the cause.
pub const USER_FACING_LOAD_ERROR: &str = "Failed to load files. Please try again later.";

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The namespace listing call failed (network, permission, not-found).
    #[display("failed to enumerate namespace `{_0}`")]
    Enumeration(#[error(not(source))] String),
    /// URL or metadata resolution failed for an object after enumeration
    /// succeeded.
    #[display("failed to resolve object `{_0}`")]
    Resolution(#[error(not(source))] String),
    /// More than one record carries a name that a slot targets.
    #[display("{_1} objects share the name `{_0}`")]
    Integrity(#[error(not(source))] String, #[error(not(source))] usize),
    /// The same filename or slot id appears twice in a slot map.
    #[display("duplicate slot mapping for `{_0}`")]
    DuplicateSlot(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    ///
    /// Loads are never retried automatically; this only tells a caller
    /// whether offering a reload is worthwhile.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Enumeration(_) | Self::Resolution(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::Enumeration("files".to_string()).to_string(), "failed to enumerate namespace `files`");
        assert_eq!(ErrorKind::Resolution("a.mp4".to_string()).to_string(), "failed to resolve object `a.mp4`");
        assert_eq!(ErrorKind::Integrity("a.mp4".to_string(), 2).to_string(), "2 objects share the name `a.mp4`");
    }

    #[test]
    fn error_kind_retryable() {
        assert!(ErrorKind::Enumeration("files".to_string()).is_retryable());
        assert!(!ErrorKind::Integrity("a.mp4".to_string(), 2).is_retryable());
        assert!(!ErrorKind::DuplicateSlot("slotA".to_string()).is_retryable());
    }
}
