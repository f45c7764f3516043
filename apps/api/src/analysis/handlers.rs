//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::Deserialize;
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::analysis::documents::{DocumentError, UploadedDocument, MAX_DOCUMENT_BYTES};
use crate::analysis::models::AnalysisResult;
use crate::errors::AppError;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub job_text: String,
    pub cv_text: String,
}

/// A file shipped inside a JSON body with base64 content.
#[derive(Debug, Deserialize)]
pub struct EncodedFile {
    pub name: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub size: u64,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeEncodedRequest {
    pub job: EncodedFile,
    pub cv: EncodedFile,
}

impl EncodedFile {
    fn into_document(self, field: &str) -> Result<UploadedDocument, AppError> {
        if self.size > MAX_DOCUMENT_BYTES as u64 {
            return Err(DocumentError::TooLarge {
                field: field.to_string(),
                size: usize::try_from(self.size).unwrap_or(usize::MAX),
            }
            .into());
        }
        let bytes = STANDARD
            .decode(self.content.trim())
            .map_err(|e| AppError::Validation(format!("{field} content is not valid base64: {e}")))?;
        Ok(UploadedDocument {
            field: field.to_string(),
            file_name: Some(self.name),
            content_type: Some(self.content_type),
            bytes: Bytes::from(bytes),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart upload with `job` and `cv` file fields (PDF or text).
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalysisResult>, AppError> {
    let mut job = None;
    let mut cv = None;

    while let Some(field) = multipart
        .next_field()
        .await?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name != "job" && name != "cv" {
            continue;
        }
        let file_name = field.file_name().map(String::from);
        let content_type = field.content_type().map(String::from);
        let bytes = field.bytes().await?;

        let document = UploadedDocument {
            field: name.clone(),
            file_name,
            content_type,
            bytes,
        };
        if name == "job" {
            job = Some(document);
        } else {
            cv = Some(document);
        }
    }

    let (Some(job), Some(cv)) = (job, cv) else {
        return Err(AppError::Validation(
            "Fields 'job' and 'cv' must be files".to_string(),
        ));
    };

    analyze_documents(&state, job, cv).await.map(Json)
}

/// POST /api/v1/analyze/encoded
///
/// JSON body carrying both files base64-encoded, for RPC-style clients that
/// cannot send multipart.
pub async fn handle_analyze_encoded(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeEncodedRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let job = request.job.into_document("job")?;
    let cv = request.cv.into_document("cv")?;
    analyze_documents(&state, job, cv).await.map(Json)
}

/// POST /api/v1/analyze/text
///
/// Skips document extraction: both texts arrive ready to analyze.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalysisResult>, AppError> {
    let request_id = Uuid::new_v4();
    let result = state
        .analyzer
        .analyze(&request.job_text, &request.cv_text)
        .instrument(info_span!("analyze", %request_id))
        .await?;
    Ok(Json(result))
}

async fn analyze_documents(
    state: &AppState,
    job: UploadedDocument,
    cv: UploadedDocument,
) -> Result<AnalysisResult, AppError> {
    let request_id = Uuid::new_v4();
    async move {
        let (job_text, cv_text) = tokio::try_join!(job.extract_text(), cv.extract_text())?;
        info!(
            "Extracted texts - JD length: {}, CV length: {}",
            job_text.len(),
            cv_text.len()
        );
        Ok::<_, AppError>(state.analyzer.analyze(&job_text, &cv_text).await?)
    }
    .instrument(info_span!("analyze", %request_id))
    .await
}
