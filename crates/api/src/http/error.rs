//! Mapping of domain errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lexsync_domain::LexSyncError;
use serde_json::json;

/// Domain error carried out of a handler.
#[derive(Debug)]
pub struct ApiError(pub LexSyncError);

impl From<LexSyncError> for ApiError {
    fn from(value: LexSyncError) -> Self {
        ApiError(value)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            LexSyncError::Auth(_) => StatusCode::UNAUTHORIZED,
            LexSyncError::Forbidden(_) => StatusCode::FORBIDDEN,
            LexSyncError::NotFound(_) => StatusCode::NOT_FOUND,
            LexSyncError::Conflict(_) => StatusCode::CONFLICT,
            LexSyncError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            LexSyncError::RemoteApi(_) | LexSyncError::Network(_) => StatusCode::BAD_GATEWAY,
            LexSyncError::Database(_) | LexSyncError::Config(_) | LexSyncError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.0 }))).into_response()
    }
}
