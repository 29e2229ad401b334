use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use quill_core::storage::{
    key_error_to_status_code, repository_error_to_status_code, retry_after_seconds, KeyError,
    RepositoryError,
};

use crate::services::ServiceError;

/// Application error type that wraps `anyhow::Error`.
///
/// Storage and key errors keep their own status codes; anything else is a 500.
pub struct AppError(pub anyhow::Error);

impl AppError {
    fn repository_error(&self) -> Option<&RepositoryError> {
        match self.0.downcast_ref::<ServiceError>() {
            Some(ServiceError::Repository(err)) => Some(err),
            Some(ServiceError::Key(_)) => None,
            None => self.0.downcast_ref::<RepositoryError>(),
        }
    }

    fn key_error(&self) -> Option<&KeyError> {
        match self.0.downcast_ref::<ServiceError>() {
            Some(ServiceError::Key(err)) => Some(err),
            Some(ServiceError::Repository(_)) => None,
            None => self.0.downcast_ref::<KeyError>(),
        }
    }

    fn status_code(&self) -> StatusCode {
        let code = if let Some(err) = self.repository_error() {
            repository_error_to_status_code(err)
        } else if let Some(err) = self.key_error() {
            key_error_to_status_code(err)
        } else {
            500
        };
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            tracing::error!(error = %self.0, "Application error");
        } else {
            tracing::debug!(error = %self.0, status = %status_code, "Request failed");
        }

        let retry_after = self.repository_error().and_then(retry_after_seconds);
        let mut response = (status_code, self.0.to_string()).into_response();
        if let Some(seconds) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
