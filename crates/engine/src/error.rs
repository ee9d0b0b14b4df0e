//! crates/engine/src/error.rs
//! Error type shared by every stage of a sync run.

use std::io;

use fsentry::{IdParseError, ProjectionError};
use thiserror::Error;

use crate::mode::Locator;

/// Exit status for a successful run.
pub const EXIT_OK: i32 = 0;
/// Exit status for a propagated failure.
pub const EXIT_FAILURE: i32 = 1;
/// Exit status for a command line usage error (`EX_USAGE`).
pub const EXIT_USAGE: i32 = 64;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A store reported a failure with its own diagnostic.
    #[error("{backend}: {message}")]
    Backend {
        /// Name of the reporting backend.
        backend: String,
        /// Diagnostic provided by the backend.
        message: String,
    },
    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    /// An entry could not be projected.
    #[error("projection failed: {0}")]
    Projection(
        #[from]
        #[source]
        ProjectionError,
    ),
    /// The destination returned without reading every event of a batch.
    #[error("destination consumed {consumed} of {submitted} events")]
    Incomplete {
        /// Events in the batch.
        submitted: usize,
        /// Events the destination pulled.
        consumed: usize,
    },
    /// A locator did not resolve to an entry.
    #[error("no entry at {0}")]
    NotFound(Locator),
    /// A locator was malformed.
    #[error("invalid locator: {0}")]
    Locator(
        #[from]
        #[source]
        IdParseError,
    ),
    /// Invalid invocation.
    #[error("{0}")]
    Usage(String),
}

impl SyncError {
    /// Builds a store-specific failure.
    pub fn backend(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Returns `true` when the diagnostic comes from a store.
    #[must_use]
    pub const fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }

    /// Process exit status for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn backend_errors_carry_their_diagnostic() {
        let error = SyncError::backend("json", "duplicate key");

        assert!(error.is_backend());
        assert_eq!(error.to_string(), "json: duplicate key");
        assert_eq!(error.exit_code(), EXIT_FAILURE);
    }

    #[test]
    fn io_errors_are_generic() {
        let error: SyncError = io::Error::other("disk").into();

        assert!(!error.is_backend());
        assert!(error.to_string().contains("I/O error"));
        assert!(error.source().is_some());
    }

    #[test]
    fn usage_errors_map_to_ex_usage() {
        assert_eq!(SyncError::Usage("missing DEST".to_owned()).exit_code(), 64);
    }

    #[test]
    fn incomplete_reports_both_counts() {
        let error = SyncError::Incomplete {
            submitted: 5,
            consumed: 2,
        };
        assert_eq!(error.to_string(), "destination consumed 2 of 5 events");
    }

    #[test]
    fn projection_errors_convert() {
        let error: SyncError = ProjectionError::SymlinkTooLong { len: 5000 }.into();
        assert!(matches!(error, SyncError::Projection(_)));
    }
}
