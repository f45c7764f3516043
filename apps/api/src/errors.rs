use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::analysis::documents::DocumentError;
use crate::analysis::AnalysisError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload error: {0}")]
    Upload(#[from] MultipartError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Analysis(#[from] AnalysisError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details: Option<Value> = None;

        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Upload(e) if e.status() == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                e.body_text(),
            ),
            AppError::Upload(e) => (e.status(), "VALIDATION_ERROR", e.body_text()),
            AppError::Document(e @ DocumentError::TooLarge { .. }) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PAYLOAD_TOO_LARGE",
                e.to_string(),
            ),
            AppError::Document(e) => (StatusCode::BAD_REQUEST, "DOCUMENT_ERROR", e.to_string()),
            AppError::Analysis(AnalysisError::EmptyInput) => (
                StatusCode::BAD_REQUEST,
                "EMPTY_INPUT",
                "Could not extract text from the job description or CV".to_string(),
            ),
            AppError::Analysis(AnalysisError::Gateway(LlmError::Auth(msg))) => {
                tracing::error!("Gateway credential error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "GATEWAY_AUTH_ERROR",
                    "The analysis service is not configured correctly".to_string(),
                )
            }
            AppError::Analysis(AnalysisError::Gateway(e)) => {
                tracing::error!("Gateway error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    "The AI service is unavailable, please try again".to_string(),
                )
            }
            AppError::Analysis(e @ AnalysisError::Parse(_)) => {
                tracing::error!("Model output error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_OUTPUT_ERROR",
                    "The AI service returned an unusable analysis, please try again".to_string(),
                )
            }
            AppError::Analysis(AnalysisError::Schema(issues)) => {
                tracing::error!("Model output error: {self}");
                details = Some(json!(issues));
                (
                    StatusCode::BAD_GATEWAY,
                    "MODEL_OUTPUT_ERROR",
                    "The AI service returned an unusable analysis, please try again".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(issues) = details {
            error["issues"] = issues;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::error::SchemaIssue;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_user_correctable_errors_are_4xx() {
        assert_eq!(
            status_of(AppError::Analysis(AnalysisError::EmptyInput)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Validation("missing cv".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Document(DocumentError::TooLarge {
                field: "cv".to_string(),
                size: 10
            })),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_gateway_and_model_errors_are_5xx() {
        assert_eq!(
            status_of(AppError::Analysis(AnalysisError::Gateway(LlmError::Auth(
                "unset".to_string()
            )))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(AppError::Analysis(AnalysisError::Gateway(
                LlmError::Upstream {
                    status: 500,
                    body: String::new()
                }
            ))),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(AppError::Analysis(AnalysisError::Schema(vec![SchemaIssue {
                path: "overallScore".to_string(),
                message: "required".to_string(),
            }]))),
            StatusCode::BAD_GATEWAY
        );
    }
}
