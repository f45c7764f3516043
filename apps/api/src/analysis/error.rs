use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::llm_client::LlmError;

/// One schema violation, addressed by dotted path (`analysis.strengths.2`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaIssue {
    pub path: String,
    pub message: String,
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Everything that can go wrong between receiving two texts and returning
/// a validated result.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Empty job description or CV text")]
    EmptyInput,

    #[error(transparent)]
    Gateway(#[from] LlmError),

    #[error("Model did not return JSON: {0}")]
    Parse(String),

    #[error("Invalid analysis JSON schema: {}", join_issues(.0))]
    Schema(Vec<SchemaIssue>),
}

impl AnalysisError {
    /// Stage label used in logs.
    pub fn stage(&self) -> &'static str {
        match self {
            AnalysisError::EmptyInput => "input",
            AnalysisError::Gateway(_) => "gateway",
            AnalysisError::Parse(_) => "parse",
            AnalysisError::Schema(_) => "schema",
        }
    }
}

fn join_issues(issues: &[SchemaIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_message_lists_every_issue() {
        let err = AnalysisError::Schema(vec![
            SchemaIssue {
                path: "overallScore".to_string(),
                message: "expected integer".to_string(),
            },
            SchemaIssue {
                path: String::new(),
                message: "unrecognized key \"extra\"".to_string(),
            },
        ]);
        assert_eq!(
            err.to_string(),
            "Invalid analysis JSON schema: overallScore: expected integer; (root): unrecognized key \"extra\""
        );
    }

    #[test]
    fn test_gateway_error_is_transparent() {
        let err = AnalysisError::from(LlmError::Upstream {
            status: 429,
            body: "slow down".to_string(),
        });
        assert_eq!(err.to_string(), "Gateway returned status 429: slow down");
        assert_eq!(err.stage(), "gateway");
    }
}
