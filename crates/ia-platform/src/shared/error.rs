//! Platform Error Types
//!
//! Crate-level error for the HTTP layer and for infrastructure work
//! (index creation, seeding, backend bootstrap).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

use crate::access::AccessError;
use crate::shared::api_common::ErrorResponse;
use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum PlatformError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type Result<T> = std::result::Result<T, PlatformError>;

impl IntoResponse for PlatformError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            PlatformError::Access(err) => (
                StatusCode::from_u16(err.http_status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                err.code(),
            ),
            PlatformError::Store(StoreError::NotFound { .. }) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            PlatformError::Store(StoreError::Conflict { .. }) => (StatusCode::CONFLICT, "DUPLICATE"),
            PlatformError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            PlatformError::Database(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_errors_keep_their_status() {
        let response = PlatformError::from(AccessError::already_exists("Admin")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let response = PlatformError::from(AccessError::cancelled("timed out")).into_response();
        assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    }

    #[test]
    fn test_infrastructure_errors_are_500() {
        let response = PlatformError::from(StoreError::Backend("connection reset".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = PlatformError::from(StoreError::conflict("Role", "Admin")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }
}
