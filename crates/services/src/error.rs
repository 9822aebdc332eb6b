//! Shared error types for the services crate.

use thiserror::Error;

use course_core::model::{CatalogError, LessonId};
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CompletionTracker`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CompletionError {
    #[error("lesson {0} is not in the catalog")]
    UnknownLesson(LessonId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `PlaybackCoordinator`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PlaybackError {
    #[error("lesson {0} is not in the catalog")]
    UnknownLesson(LessonId),
    #[error("no lesson is selected")]
    NoSelection,
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Errors reported by a video surface implementation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SurfaceError {
    #[error("video player unavailable: {0}")]
    Unavailable(String),
}

/// Errors emitted by `CertificateEmitter`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CertificateError {
    #[error("certificate generation failed: {0}")]
    Render(String),
    #[error("could not save certificate: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("could not read catalog file: {0}")]
    CatalogFile(#[from] std::io::Error),
}
