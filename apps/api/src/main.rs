mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::prompts::PROMPT_VERSION;
use crate::analysis::request_builder::MODEL;
use crate::analysis::CvAnalyzer;
use crate::config::Config;
use crate::llm_client::rate_limit::{PER_HOUR_CAP, PER_MINUTE_CAP};
use crate::llm_client::{usable_token, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting FitScore API v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = usable_token(config.gateway_auth_token.as_deref()) {
        warn!("{e}; analysis requests will fail until it is configured");
    }

    // One client for the whole process, so every request shares the rate gates.
    let llm = LlmClient::new(config.gateway_url.clone(), config.gateway_auth_token.clone())?;
    info!(
        "LLM client initialized (gateway: {}, model: {}, prompt: {}, caps: {}/min {}/h)",
        llm.endpoint(),
        MODEL,
        PROMPT_VERSION,
        PER_MINUTE_CAP,
        PER_HOUR_CAP
    );

    let state = AppState {
        analyzer: CvAnalyzer::new(Arc::new(llm)),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
