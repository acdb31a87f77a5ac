//! CLI Error Types
//!
//! Library errors are wrapped here and converted to a [`miette`] report at the
//! very top of `main`.

use derive_more::{Display, Error};

pub type Error = exn::Exn<ErrorKind>;
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("configuration error")]
    Config,
    /// The configured object store could not be set up.
    #[display("storage error")]
    Storage,
    /// Built without support for the configured storage type.
    #[display("storage type not supported by this build: {_0}")]
    Unsupported(#[error(not(source))] String),
    #[display("failed to load assets")]
    Load,
    #[display("failed to render page")]
    Render,
    #[display("failed to write output")]
    Output,
}
