//! Shared error types for the services crate.

use thiserror::Error;

use learn_core::model::CourseId;
use storage::StorageError;
use storage::http::RemoteConfigError;

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogServiceError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("course {0} is not in the catalog")]
    UnknownCourse(CourseId),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Remote(#[from] RemoteConfigError),
}
