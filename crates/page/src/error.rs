//! Page Error Types
//!
//! Structured errors using `exn` for automatic location tracking, mirroring
//! the other workspace crates.

use derive_more::{Display, Error};

/// A page rendering error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for page operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The template failed to compile or render.
    #[display("template error")]
    Template,
    /// Neither a builtin nor a readable user template of that name exists.
    #[display("template not found: {_0}")]
    TemplateNotFound(#[error(not(source))] String),
    /// Loaded records could not be bound to the configured slots.
    #[display("asset binding failed")]
    Binding,
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
