use crate::engine::ScoringError;
use crate::store::StoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            AppError::Scoring(err) => {
                let status = match err {
                    ScoringError::Validation(_)
                    | ScoringError::InvalidSetup(_)
                    | ScoringError::NothingToUndo(_) => StatusCode::UNPROCESSABLE_ENTITY,
                    ScoringError::InningsOrder(_)
                    | ScoringError::MatchState(_)
                    | ScoringError::Storage(StoreError::Conflict(_)) => StatusCode::CONFLICT,
                    ScoringError::NotFound(_) => StatusCode::NOT_FOUND,
                    ScoringError::Storage(StoreError::Timeout(_)) => {
                        StatusCode::SERVICE_UNAVAILABLE
                    }
                    ScoringError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                let message = match err {
                    // Backend detail stays in the log.
                    ScoringError::Storage(StoreError::Conflict(_)) => {
                        "the write conflicts with existing data".to_string()
                    }
                    ScoringError::Storage(_) => "storage is temporarily unavailable".to_string(),
                    other => other.to_string(),
                };
                (status, err.code(), message)
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        if status.is_server_error() {
            error!(error = %self, code, "Request failed");
        }

        let body = Json(json!({
            "error": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}
