use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::plants::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadInput(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Text generation blocked: {message} (reason: {reason})")]
    GenerationBlocked { reason: String, message: String },

    #[error("Text generation failed: {0}")]
    GenerationFailed(String),

    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// The one place an error variant is mapped to an HTTP status.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadInput(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::GenerationBlocked { .. } => StatusCode::BAD_REQUEST,
            AppError::GenerationFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::MalformedBody(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            conflict @ StoreError::Conflict { .. } => AppError::Conflict(conflict.to_string()),
            StoreError::Database(e) => {
                AppError::Internal(anyhow::Error::new(e).context("Store operation failed"))
            }
        }
    }
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Blocked { reason, message } => AppError::GenerationBlocked { reason, message },
            other => AppError::GenerationFailed(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let message = match &self {
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::GenerationFailed(msg) => {
                tracing::error!("Generation error: {msg}");
                self.to_string()
            }
            AppError::MalformedBody(msg) => {
                tracing::error!("Malformed request body: {msg}");
                self.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "success": false,
            "error": message
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_table() {
        let cases = [
            (AppError::BadInput("x".into()), StatusCode::BAD_REQUEST),
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (AppError::Conflict("x".into()), StatusCode::CONFLICT),
            (
                AppError::GenerationBlocked {
                    reason: "SAFETY".into(),
                    message: "blocked".into(),
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::GenerationFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::MalformedBody("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code(), status, "{err}");
        }
    }

    #[test]
    fn test_store_conflict_names_slug_and_language() {
        let err: AppError = StoreError::Conflict {
            slug: "minha-rosa".into(),
            language: "pt-BR".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::CONFLICT);
        let msg = err.to_string();
        assert!(msg.contains("minha-rosa") && msg.contains("pt-BR"));
    }

    #[test]
    fn test_blocked_llm_error_maps_to_bad_request() {
        let err: AppError = LlmError::Blocked {
            reason: "SAFETY".into(),
            message: "unsafe prompt".into(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains("unsafe prompt"));
    }

    #[tokio::test]
    async fn test_error_envelope_shape() {
        let response = AppError::NotFound("Plant not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Plant not found");
    }
}
