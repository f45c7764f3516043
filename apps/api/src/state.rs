use crate::analysis::CvAnalyzer;
use crate::config::Config;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Owns the gateway client, and with it the process-wide rate gates.
    pub analyzer: CvAnalyzer,
    pub config: Config,
}
