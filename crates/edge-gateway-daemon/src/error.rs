//! HTTP error mapping.
//!
//! Validation faults and remote faults never share a status or a shape.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use edge_gateway_client::ClientError;
use edge_gateway_core::ValidationError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller sent a malformed request; nothing was dispatched.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Body was not parseable JSON.
    #[error("request body must be valid JSON: {0}")]
    Body(String),

    /// The command could not be carried to the remote or back.
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            Self::Validation(_) | Self::Body(_) => {
                tracing::debug!(error = %self, "rejected request");
                (StatusCode::BAD_REQUEST, Json(json!({ "error": self.to_string() })))
                    .into_response()
            }
            Self::Client(err) => {
                tracing::error!(code = err.code(), error = %err, "command failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "error": { "code": err.code(), "message": err.to_string() },
                    })),
                )
                    .into_response()
            }
        }
    }
}
