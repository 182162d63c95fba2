use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::users::repo::StoreError;

/// Everything a handler can fail with. Handlers never map errors to
/// responses themselves; the `IntoResponse` impl below owns that policy.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing id. Answered with plain text, never with the
    /// shared JSON error body.
    #[error("{0}")]
    BadId(&'static str),
    /// A required create field was missing or empty.
    #[error("invalid user input: {0}")]
    InvalidInput(&'static str),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadId(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::InvalidInput(field) => {
                warn!(%field, "rejected user input");
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({ "error": format!("field '{field}' is required") })),
                )
                    .into_response()
            }
            ApiError::Store(StoreError::NotFound(id)) => (
                StatusCode::NOT_FOUND,
                Json(json!({ "error": format!("user {id} not found") })),
            )
                .into_response(),
            ApiError::Store(StoreError::Database(e)) => {
                error!(error = %e, "store failure");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "internal server error" })),
                )
                    .into_response()
            }
        }
    }
}
