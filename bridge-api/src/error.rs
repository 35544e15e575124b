//! HTTP error mapping

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use bridge_core::BridgeError;

/// Wrapper that turns a [`BridgeError`] into a JSON error response.
#[derive(Debug)]
pub struct ApiError(pub BridgeError);

impl From<BridgeError> for ApiError {
    fn from(e: BridgeError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BridgeError::MissingField(_) | BridgeError::EmptyPayload | BridgeError::Parse(_) => {
                StatusCode::BAD_REQUEST
            }
            BridgeError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}
