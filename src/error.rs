//! HTTP-facing error taxonomy.
//!
//! Provider failures never reach this module (the scrape layer falls back to
//! mock data), and write-path storage failures are downgraded to a `Skipped`
//! outcome by the API layer. What remains: bad input, nothing found, read-path
//! storage failures, and everything unexpected.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing caller input.
    #[error("{0}")]
    Validation(String),

    /// Well-formed request, no matching data.
    #[error("{0}")]
    NotFound(String),

    /// Read-path storage failure.
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),

    /// Anything unanticipated.
    #[error("{0}")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.to_string(),
            "status": "error",
        });
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_maps_to_400() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(
            ApiError::NotFound("nothing".into()).status_code(),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn internal_maps_to_500() {
        let err = ApiError::Internal(anyhow::anyhow!("boom"));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
