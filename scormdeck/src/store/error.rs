//! Error types for package storage.

use std::io;

use thiserror::Error;

/// Errors that can occur during package store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested file or directory does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A path segment was empty, relative, or contained a separator.
    #[error("invalid path segment: {0:?}")]
    InvalidSegment(String),

    /// An empty path was supplied where at least one segment is required.
    #[error("empty store path")]
    EmptyPath,

    /// Underlying I/O failure.
    #[error("storage I/O failed at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// A write handle was used after commit or abort.
    #[error("write handle already closed")]
    WriterClosed,
}

impl StoreError {
    /// Wrap an I/O error with the store path it occurred at.
    pub(crate) fn io(path: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True if this error means the entry simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
