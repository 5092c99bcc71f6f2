//! Crate-level error type
//!
//! Recoverable conditions (unrecognized declarations, skipped functions) are
//! not errors — they are collected as [`crate::diag::Diagnostic`]s and the run
//! continues. [`Error`] covers the conditions that abort a generation run:
//! I/O failures, unusable configuration, and structurally malformed input.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file could not be read or contains an unusable
    /// value (e.g. an invalid regular expression).
    #[error("configuration: {0}")]
    Config(String),

    /// The token stream violated the tree invariant (close bracket with no
    /// open node, or a node left open at end of input).
    #[error("malformed header: {0}")]
    MalformedInput(String),
}

impl From<crate::parser::tree::TreeError> for Error {
    fn from(err: crate::parser::tree::TreeError) -> Self {
        Error::MalformedInput(err.message)
    }
}
