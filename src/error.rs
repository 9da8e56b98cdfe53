//! Error types for record decoding.
//!
//! Two layers of errors exist in this crate:
//!
//! - [`DecodeError`] is returned by the pure decoding paths (header parsing,
//!   MMI sub-packets, BTM fragments, record dispatch). It is cheap to clone and
//!   compare, and carries the structural context of the failure.
//! - [`Error`] is returned by the outer layers that touch files, configuration
//!   and async feeds. It wraps [`DecodeError`] and adds I/O and policy failures.
//!
//! ## Error Categories
//!
//! - **Truncated**: not enough bytes at a parse boundary (header, length byte, body)
//! - **InvalidTimestamp**: a date/time component outside its civil range
//! - **InvalidOrdinal**: a BTM fragment ordinal outside 1..=5
//! - **TooShort**: an MMI sub-packet body below its minimum size
//!
//! Unknown record kinds and MMI sub-packet tags are never errors; they decode
//! to `Unknown` payloads carrying the raw bytes.
//!
//! ## Recovery
//!
//! ```rust
//! use atp_decode::{DecodeError, Error};
//!
//! let error: Error = DecodeError::InvalidOrdinal(7).into();
//! if error.is_recoverable() {
//!     for suggestion in error.recovery_suggestions() {
//!         println!("  - {}", suggestion);
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for the outer (file, config, feed) layers.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Structural failure while decoding a record or one of its parts.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("Truncated {context}: need {needed} bytes, have {available}")]
    Truncated { context: &'static str, needed: usize, available: usize },

    #[error("Invalid timestamp: {field} = {value}")]
    InvalidTimestamp { field: &'static str, value: u16 },

    #[error("Invalid BTM ordinal {0} (expected 1..=5)")]
    InvalidOrdinal(u8),

    #[error("{packet} body too short: need {needed} bytes, have {available}")]
    TooShort { packet: &'static str, needed: usize, available: usize },
}

impl DecodeError {
    /// Helper constructor for truncation at a named boundary.
    pub fn truncated(context: &'static str, needed: usize, available: usize) -> Self {
        DecodeError::Truncated { context, needed, available }
    }

    /// Helper constructor for short sub-packet bodies.
    pub fn too_short(packet: &'static str, needed: usize, available: usize) -> Self {
        DecodeError::TooShort { packet, needed, available }
    }
}

/// Main error type for scanning, configuration and feed operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("Record file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error in {context}: {details}")]
    Config { context: String, details: String },

    #[error("Too many decode errors ({limit}) while scanning, last at offset {offset}")]
    TooManyErrors { limit: usize, offset: usize },

    #[error("Record source closed unexpectedly")]
    SourceClosed,
}

impl Error {
    /// Returns whether a scanner can skip past this error and keep going.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Decode(DecodeError::Truncated { .. }) => true,
            Error::Decode(DecodeError::InvalidTimestamp { .. }) => true,
            Error::Decode(DecodeError::InvalidOrdinal(_)) => true,
            Error::Decode(DecodeError::TooShort { .. }) => true,
            Error::File { .. } => false,
            Error::Config { .. } => false,
            Error::TooManyErrors { .. } => false,
            Error::SourceClosed => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            Error::Decode(DecodeError::Truncated { .. }) => vec![
                "Check whether the file was fully copied from the recorder",
                "Scan with the resync error policy to skip damaged regions",
            ],
            Error::Decode(DecodeError::InvalidTimestamp { .. }) => vec![
                "Check the scanner is aligned on a record boundary",
                "Verify the file profile (record vs MMI) matches the file",
            ],
            Error::Decode(DecodeError::InvalidOrdinal(_)) => vec![
                "Derive ordinals from BTM record kinds 43..=47 only",
            ],
            Error::Decode(DecodeError::TooShort { .. }) => vec![
                "Check the declared body length of the record",
                "Verify the MMI sub-packet tag matches its payload",
            ],
            Error::File { .. } => vec![
                "Check file exists and is readable",
                "Check file permissions",
            ],
            Error::Config { .. } => vec![
                "Check the YAML syntax of the configuration",
                "Remove unknown keys from the configuration",
            ],
            Error::TooManyErrors { .. } => vec![
                "Verify the file profile matches the file",
                "Raise max_errors in the scan configuration",
            ],
            Error::SourceClosed => vec!["Check the producer feeding the live source"],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        Error::File { path, source }
    }

    /// Helper constructor for configuration errors.
    pub fn config(context: impl Into<String>, details: impl Into<String>) -> Self {
        Error::Config { context: context.into(), details: details.into() }
    }

    /// The underlying decode error, if this is one.
    pub fn as_decode(&self) -> Option<&DecodeError> {
        match self {
            Error::Decode(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::File { path: PathBuf::from("<unknown>"), source: err }
    }
}
