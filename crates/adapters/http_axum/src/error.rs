//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use rainhub_domain::error::RainHubError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`RainHubError`] to an HTTP response with appropriate status code.
#[derive(Debug)]
pub struct ApiError(RainHubError);

impl From<RainHubError> for ApiError {
    fn from(err: RainHubError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            RainHubError::Validation(_) => StatusCode::BAD_REQUEST,
            RainHubError::NotFound(_) => StatusCode::NOT_FOUND,
            RainHubError::Scheduling(_) => StatusCode::SERVICE_UNAVAILABLE,
            RainHubError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self.0 {
            RainHubError::Validation(err) => err.to_string(),
            RainHubError::NotFound(err) => err.to_string(),
            RainHubError::Scheduling(err) => {
                tracing::warn!(error = %err, "engine unavailable");
                err.to_string()
            }
            RainHubError::Storage(err) => {
                tracing::error!(error = %err, "storage error");
                "internal server error".to_string()
            }
        };

        (status, Json(ErrorBody { error: message })).into_response()
    }
}
