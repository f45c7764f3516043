//! CV Analysis — the single entry point callers use.
//!
//! Flow: reject blank input → build request → gateway call →
//!       normalize response → validate.
//!
//! Nothing is retried. The first error is logged with its stage and handed
//! back unchanged; callers decide whether to retry the whole operation.

use std::sync::Arc;

use tracing::{info, warn};

use crate::analysis::error::AnalysisError;
use crate::analysis::models::AnalysisResult;
use crate::analysis::prompts::PROMPT_VERSION;
use crate::analysis::request_builder::build_analysis_request;
use crate::analysis::analyze_response;
use crate::llm_client::{LlmError, ModelGateway};

#[derive(Clone)]
pub struct CvAnalyzer {
    gateway: Arc<dyn ModelGateway>,
}

impl CvAnalyzer {
    pub fn new(gateway: Arc<dyn ModelGateway>) -> Self {
        Self { gateway }
    }

    /// Scores `cv_text` against `job_text`.
    pub async fn analyze(
        &self,
        job_text: &str,
        cv_text: &str,
    ) -> Result<AnalysisResult, AnalysisError> {
        if job_text.trim().is_empty() || cv_text.trim().is_empty() {
            return Err(AnalysisError::EmptyInput);
        }

        info!(
            "Analyzing CV ({} chars) against job description ({} chars) with prompt {}",
            cv_text.len(),
            job_text.len(),
            PROMPT_VERSION
        );

        let request = build_analysis_request(job_text, cv_text);
        let raw = self
            .gateway
            .generate(&request)
            .await
            .map_err(AnalysisError::from)
            .inspect_err(log_failure)?;

        let result = analyze_response(&raw).inspect_err(log_failure)?;

        info!(
            "Analysis complete: overallScore={}, {} matched / {} missing skills",
            result.overall_score,
            result.analysis.detailed_analysis.technical_skills.matched.len(),
            result.analysis.detailed_analysis.technical_skills.missing.len()
        );
        Ok(result)
    }
}

fn log_failure(err: &AnalysisError) {
    match err {
        AnalysisError::Gateway(LlmError::Upstream { status, .. }) => {
            warn!("CV analysis failed at {} stage (status {status}): {err}", err.stage());
        }
        AnalysisError::Schema(issues) => {
            warn!(
                "CV analysis failed at {} stage ({} issues): {err}",
                err.stage(),
                issues.len()
            );
        }
        _ => warn!("CV analysis failed at {} stage: {err}", err.stage()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::test_support::{output_text, valid_result_json, StubGateway};
    use crate::llm_client::Role;
    use serde_json::json;

    fn analyzer(gateway: &Arc<StubGateway>) -> CvAnalyzer {
        CvAnalyzer::new(Arc::clone(gateway) as Arc<dyn ModelGateway>)
    }

    #[tokio::test]
    async fn test_blank_inputs_never_reach_gateway() {
        let gateway = Arc::new(StubGateway::replying(output_text(&valid_result_json())));
        let analyzer = analyzer(&gateway);

        for (job, cv) in [("", "some cv text"), ("job text", "   "), ("\n\t", "cv")] {
            let err = analyzer.analyze(job, cv).await.unwrap_err();
            assert!(matches!(err, AnalysisError::EmptyInput));
        }
        assert!(gateway.requests().is_empty());
    }

    #[tokio::test]
    async fn test_successful_analysis_returns_validated_result() {
        let expected = valid_result_json();
        let gateway = Arc::new(StubGateway::replying(output_text(&expected)));

        let result = analyzer(&gateway)
            .analyze("Senior Rust engineer", "Ten years of Rust")
            .await
            .unwrap();
        assert_eq!(serde_json::to_value(&result).unwrap(), expected);
    }

    #[tokio::test]
    async fn test_gateway_receives_built_request_once() {
        let gateway = Arc::new(StubGateway::replying(output_text(&valid_result_json())));
        analyzer(&gateway)
            .analyze("JOB-MARKER", "CV-MARKER")
            .await
            .unwrap();

        let requests = gateway.requests();
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(request, &build_analysis_request("JOB-MARKER", "CV-MARKER"));
        assert_eq!(request.contents[0].role, Role::User);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_propagated_unchanged() {
        let gateway = Arc::new(StubGateway::failing(502));
        let err = analyzer(&gateway).analyze("job", "cv").await.unwrap_err();
        match err {
            AnalysisError::Gateway(LlmError::Upstream { status, .. }) => assert_eq!(status, 502),
            other => panic!("expected upstream error, got {other:?}"),
        }
        assert_eq!(gateway.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_model_output_is_schema_error() {
        let gateway = Arc::new(StubGateway::replying(json!({
            "output_text": "{\"overallScore\":\"high\",\"analysis\":{}}"
        })));
        let err = analyzer(&gateway).analyze("job", "cv").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Schema(_)));
        assert!(err.to_string().contains("overallScore"));
    }

    #[tokio::test]
    async fn test_prose_only_output_is_parse_error() {
        let gateway = Arc::new(StubGateway::replying(json!({
            "candidates": [{"content": {"parts": [{"text": "I'm sorry, I can't do that."}]}}]
        })));
        let err = analyzer(&gateway).analyze("job", "cv").await.unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }
}
