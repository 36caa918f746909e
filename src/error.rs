//! Typed failures for the cataloging core. The terminal front end and the
//! binary wrap these in `anyhow` chains; everything below the UI keeps the
//! concrete variants so callers can tell an expected duplicate apart from a
//! failed save.

use std::path::PathBuf;

use thiserror::Error;

/// Codec failures. All of them are user-correctable input problems.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsbnError {
    /// Wrong length after stripping separators, or a character that is not a
    /// digit (`X` is only tolerated as the last character of an ISBN-10).
    #[error("invalid ISBN format: {0}")]
    InvalidFormat(String),

    /// A conversion received a value of the wrong length.
    #[error("expected {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// Only `978` ISBN-13 values have an ISBN-10 equivalent.
    #[error("ISBN-13 {0} does not start with 978 and has no ISBN-10 form")]
    InvalidPrefix(String),

    #[error("check digit mismatch for {isbn}: expected {expected}")]
    InvalidChecksum { isbn: String, expected: char },
}

/// Catalog store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ISBN {0} is already in the catalog")]
    DuplicateIdentifier(String),

    #[error("ISBN {0} is not in the catalog")]
    NotFound(String),

    /// The backing file exists but failed to load, so writing over it would
    /// lose rows that were never read.
    #[error("{} failed to load; start a new catalog or import one before saving", .0.display())]
    NotLoaded(PathBuf),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read or write CSV at {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A row parsed as CSV but does not describe a valid catalog entry.
    #[error("{}: line {line}: {reason}", path.display())]
    MalformedRow {
        path: PathBuf,
        line: u64,
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        StoreError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// Failures of the HTTP fetch capability. Providers never propagate these;
/// they log them and report a non-match.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request to {url} failed: {reason}")]
    Request { url: String, reason: String },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("malformed response body: {0}")]
    Body(String),
}
