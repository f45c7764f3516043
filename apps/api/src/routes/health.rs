use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::llm_client::usable_token;
use crate::state::AppState;

/// GET /health
/// Returns service status and whether a usable gateway credential is configured.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let gateway_configured = usable_token(state.config.gateway_auth_token.as_deref()).is_ok();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "fitscore-api",
        "gateway_configured": gateway_configured
    }))
}
