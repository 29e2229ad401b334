//! Pure functions for mapping repository errors to HTTP semantics.
//!
//! Functional core: no side effects, no HTTP crate dependency.

use super::{KeyError, RepositoryError};

/// Maps a [`RepositoryError`] to an HTTP status code.
///
/// - `NotFound` -> 404 (Not Found)
/// - `Conflict` -> 409 (Conflict)
/// - `Throttled` -> 429 (Too Many Requests)
/// - `Transient` -> 503 (Service Unavailable)
/// - `InvalidData` -> 500 (Internal Server Error)
///
/// # Examples
///
/// ```
/// use quill_core::storage::{RepositoryError, repository_error_to_status_code};
///
/// let error = RepositoryError::NotFound {
///     entity_type: "Category",
///     id: "cat-1".to_string(),
/// };
/// assert_eq!(repository_error_to_status_code(&error), 404);
/// ```
pub fn repository_error_to_status_code(error: &RepositoryError) -> u16 {
    match error {
        RepositoryError::NotFound { .. } => 404,
        RepositoryError::Conflict { .. } => 409,
        RepositoryError::Throttled(_) => 429,
        RepositoryError::Transient(_) => 503,
        RepositoryError::InvalidData(_) => 500,
    }
}

/// Seconds a client should wait before retrying, when the error calls for it.
pub fn retry_after_seconds(error: &RepositoryError) -> Option<u64> {
    match error {
        RepositoryError::Throttled(_) => Some(1),
        _ => None,
    }
}

/// Rejected identifiers are a client error.
pub fn key_error_to_status_code(_error: &KeyError) -> u16 {
    400
}
