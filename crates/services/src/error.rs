//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors raised while opening or writing a quiz document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("unsupported file type: {0}")]
    UnsupportedFile(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid document archive: {0}")]
    Archive(String),
    #[error("document body not found")]
    MissingBody,
    #[error("malformed document XML: {0}")]
    Xml(String),
}

impl From<zip::result::ZipError> for DocumentError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => DocumentError::Io(io),
            zip::result::ZipError::FileNotFound => DocumentError::MissingBody,
            other => DocumentError::Archive(other.to_string()),
        }
    }
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz already completed from this address")]
    AlreadyCompleted,
    #[error("no questions available")]
    NoQuestions,
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by the dashboard and admin services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    #[error("export failed: {0}")]
    Export(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
