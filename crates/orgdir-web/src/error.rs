//! JSON error responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use orgdir_core::DirectoryError;
use serde_json::json;
use tracing::error;

/// Error returned by every handler, rendered as `{"error": message}`.
#[derive(Debug)]
pub struct ApiError(pub DirectoryError);

pub type ApiResult<T> = Result<T, ApiError>;

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DirectoryError::validation(format!(
            "Invalid JSON body: {}",
            rejection.body_text()
        )))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self(DirectoryError::validation(format!(
            "Invalid query string: {}",
            rejection.body_text()
        )))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            DirectoryError::Validation(msg) | DirectoryError::Conflict(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }
            DirectoryError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            DirectoryError::Store(detail) => {
                error!(%detail, "Request failed on graph store");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
