//! Error types for the dataset accessor.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The database file is missing, unreadable, or the handle has
    /// already been closed.
    #[error("dataset store unavailable at {path}: {reason}")]
    StorageUnavailable { path: PathBuf, reason: String },

    /// The database opened, but an expected table or column is absent.
    #[error("dataset schema mismatch: {0}")]
    SchemaMismatch(String),

    /// The stimuli archive could not be transferred.
    #[error("download of {url} failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    /// The downloaded artifact is not a valid archive or could not be
    /// extracted into place.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),

    /// Engine error from a query against an already-validated store.
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    /// CSV export could not be written.
    #[error("export failed: {0}")]
    Export(#[from] csv::Error),
}

impl Error {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Error::StorageUnavailable {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn download(url: &str, reason: impl std::fmt::Display) -> Self {
        Error::DownloadFailed {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}
