// CV analysis pipeline.
// build request → gateway call → normalize response → validate against schema.
// All gateway calls go through llm_client; nothing here talks HTTP directly.

pub mod controller;
pub mod documents;
pub mod error;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod prompts;
pub mod request_builder;
pub mod schema;
pub mod validator;

use serde_json::Value;

pub use controller::CvAnalyzer;
pub use error::AnalysisError;
pub use models::AnalysisResult;

/// Turns a raw gateway response into a validated result.
pub fn analyze_response(raw: &Value) -> Result<AnalysisResult, AnalysisError> {
    let text = normalizer::extract_json_text(raw);
    validator::parse_and_validate(&text)
}
