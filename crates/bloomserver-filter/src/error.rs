//! Error types for the filter crate

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while constructing or sizing a filter
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("Invalid filter parameters: {0}")]
    InvalidParameter(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors raised while persisting or loading a filter
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Malformed filter data: {0}")]
    Format(String),

    #[error("I/O error while {action}: {source}")]
    Io {
        action: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("I/O error on {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StoreError {
    pub(crate) fn io(action: &'static str) -> impl FnOnce(io::Error) -> Self {
        move |source| StoreError::Io { action, source }
    }

    pub(crate) fn file(path: impl Into<PathBuf>) -> impl FnOnce(io::Error) -> Self {
        let path = path.into();
        move |source| StoreError::File { path, source }
    }

    /// True for errors caused by the content of the data rather than the medium
    pub fn is_format(&self) -> bool {
        matches!(self, StoreError::Format(_))
    }
}

/// Errors raised by the substring scanner
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    #[error("Scan deadline exceeded after {tested} candidates")]
    Timeout { tested: u64 },
}
