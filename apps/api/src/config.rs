use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_GATEWAY_URL;

/// Application configuration loaded from environment variables.
///
/// The gateway token is optional here: a missing token is reported at
/// startup and then on every analysis call, but does not stop the server.
#[derive(Debug, Clone)]
pub struct Config {
    pub gateway_url: String,
    pub gateway_auth_token: Option<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gateway_url: std::env::var("GATEWAY_URL")
                .unwrap_or_else(|_| DEFAULT_GATEWAY_URL.to_string()),
            gateway_auth_token: std::env::var("GATEWAY_AUTH_TOKEN").ok(),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Config {
            gateway_url: "http://127.0.0.1:9/invoke".to_string(),
            gateway_auth_token: Some("test-token".to_string()),
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
