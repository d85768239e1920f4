//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use folio_repo::RepoError;
use folio_service::ServiceError;
use serde_json::json;

/// Anything a handler can fail with, mapped onto a status code and a
/// uniform `{"error": ...}` JSON body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Track-service failure.
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Repository failure (admin endpoints).
    #[error(transparent)]
    Repo(#[from] RepoError),

    /// Malformed request (multipart decode, bad payload).
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Service(ServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Service(ServiceError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            Self::Service(err) if err.is_client_error() => StatusCode::BAD_REQUEST,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Service(_) | Self::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Server-side failures get a generic message; details stay in logs.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "request failed");
            "internal error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
