//! DynamoDB error mapping.
//!
//! Maps backend failures to `RepositoryError` by exception name, so the
//! classification is the same for every operation and no SDK type leaks out.

use quill_core::storage::RepositoryError;

use super::backend::BackendError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Get,
    Put,
    Update,
    Delete,
    Scan,
    Query,
}

/// Map a backend error for an operation on `entity_type`/`id`.
///
/// # Error Mapping
///
/// - `ConditionalCheckFailedException` → `Conflict` on put, `NotFound` on update/delete
/// - `ProvisionedThroughputExceededException`, `ThrottlingException`,
///   `RequestLimitExceeded` → `Throttled`
/// - `ResourceNotFoundException` (missing table) → `Transient`
/// - Everything else, including transport failures → `Transient`
pub fn map_backend_error(
    err: BackendError,
    operation: Operation,
    entity_type: &'static str,
    id: impl Into<String>,
) -> RepositoryError {
    match err.code.as_deref() {
        Some("ConditionalCheckFailedException") => match operation {
            Operation::Put => RepositoryError::Conflict {
                entity_type,
                id: id.into(),
            },
            Operation::Update | Operation::Delete => RepositoryError::NotFound {
                entity_type,
                id: id.into(),
            },
            _ => RepositoryError::Transient(err.message),
        },
        Some(
            "ProvisionedThroughputExceededException"
            | "ThrottlingException"
            | "RequestLimitExceeded",
        ) => RepositoryError::Throttled(err.message),
        Some("ResourceNotFoundException") => {
            RepositoryError::Transient(format!("Table not found: {}", err.message))
        }
        _ => RepositoryError::Transient(err.message),
    }
}
