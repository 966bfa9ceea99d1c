use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::foundation::error::ShortsError;

/// Error response: `400` for validation failures, `500` otherwise, body `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError(pub ShortsError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        if self.0.is_validation() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<ShortsError> for ApiError {
    fn from(err: ShortsError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        } else {
            tracing::warn!(error = %self.0, "request rejected");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.0.to_string() })),
        )
            .into_response()
    }
}
