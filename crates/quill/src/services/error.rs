use quill_core::storage::{KeyError, RepositoryError};
use thiserror::Error;

/// Errors returned by the domain services.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Key(#[from] KeyError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

pub type Result<T> = std::result::Result<T, ServiceError>;
