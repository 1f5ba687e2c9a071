//! Shared error types for the services crate.

use thiserror::Error;

use course_core::CatalogError;
use course_core::quiz::QuizError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `CourseController`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseSessionError {
    #[error("course not found: {id}")]
    NotFound { id: String },
}

/// Errors emitted by `QuizService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("course not found: {id}")]
    NotFound { id: String },
    #[error("course {id}: {source}")]
    Quiz {
        id: String,
        #[source]
        source: QuizError,
    },
}

/// Errors emitted by `CatalogQueries`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogQueryError {
    #[error("course not found: {id}")]
    NotFound { id: String },
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
