/// LLM Client — the single point of entry for all gateway calls in the service.
///
/// ARCHITECTURAL RULE: No other module may call the model gateway directly.
/// All LLM interactions MUST go through this module, which is where the
/// per-minute and per-hour admission caps are enforced.
///
/// No retries happen here. A failed call is surfaced to the caller as-is.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;
pub mod rate_limit;

use rate_limit::RateGates;

/// Default gateway endpoint. Overridable through `GATEWAY_URL`.
pub const DEFAULT_GATEWAY_URL: &str = "https://intertest.woolf.engineering/invoke";

/// Token value shipped in sample `.env` files; never a real credential.
const PLACEHOLDER_TOKEN: &str = "your_token_here";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Gateway credential error: {0}")]
    Auth(String),

    #[error("Gateway returned status {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Gateway transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Gateway returned a non-JSON body: {0}")]
    Decode(#[from] serde_json::Error),
}

// ────────────────────────────────────────────────────────────────────────────
// Wire format
// ────────────────────────────────────────────────────────────────────────────

/// Request body posted to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub model: String,
    pub system_instruction: Content,
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Content {
    pub role: Role,
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub text: String,
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub response_mime_type: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Gateway seam
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can turn a request body into a raw gateway response.
///
/// `AppState` carries an `Arc<dyn ModelGateway>` so the pipeline can be
/// driven by a stub in tests.
#[async_trait]
pub trait ModelGateway: Send + Sync {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<Value, LlmError>;
}

/// The single LLM client used by the service. Cloning shares the HTTP
/// connection pool and the rate gates.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    endpoint: String,
    auth_token: Option<String>,
    gates: Arc<RateGates>,
}

impl LlmClient {
    pub fn new(endpoint: String, auth_token: Option<String>) -> Result<Self, LlmError> {
        Self::with_gates(endpoint, auth_token, RateGates::default())
    }

    fn with_gates(
        endpoint: String,
        auth_token: Option<String>,
        gates: RateGates,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            endpoint,
            auth_token,
            gates: Arc::new(gates),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Performs exactly one POST to the gateway once both rate gates admit it.
    /// The credential is checked first, so a misconfigured process never
    /// queues.
    pub async fn call(&self, request: &GenerateContentRequest) -> Result<Value, LlmError> {
        let auth = usable_token(self.auth_token.as_deref())?;

        self.gates.admit().await;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", auth)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(text) => text,
                Err(_) => "<no error body>".to_string(),
            };
            warn!("Gateway returned {}: {}", status, body);
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let raw: Value = serde_json::from_str(&body)?;
        debug!("Gateway call succeeded ({} bytes)", body.len());
        Ok(raw)
    }
}

#[async_trait]
impl ModelGateway for LlmClient {
    async fn generate(&self, request: &GenerateContentRequest) -> Result<Value, LlmError> {
        self.call(request).await
    }
}

/// Returns the trimmed token, rejecting missing, blank and placeholder values.
pub fn usable_token(token: Option<&str>) -> Result<&str, LlmError> {
    let token = token
        .ok_or_else(|| LlmError::Auth("GATEWAY_AUTH_TOKEN is not set".to_string()))?
        .trim();
    if token.is_empty() || token == PLACEHOLDER_TOKEN {
        return Err(LlmError::Auth(
            "GATEWAY_AUTH_TOKEN is not set to a valid token".to_string(),
        ));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::json;

    #[derive(Clone)]
    struct FakeGateway {
        hits: Arc<AtomicUsize>,
        status: StatusCode,
        reply: &'static str,
    }

    async fn fake_invoke(
        State(gw): State<FakeGateway>,
        headers: HeaderMap,
        Json(body): Json<Value>,
    ) -> (StatusCode, String) {
        gw.hits.fetch_add(1, Ordering::SeqCst);
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if auth != "secret-token" {
            return (StatusCode::UNAUTHORIZED, "bad token".to_string());
        }
        if body.get("model").is_none() || body.get("systemInstruction").is_none() {
            return (StatusCode::BAD_REQUEST, "malformed body".to_string());
        }
        (gw.status, gw.reply.to_string())
    }

    /// Starts a local gateway stand-in and returns its URL and hit counter.
    async fn spawn_gateway(status: StatusCode, reply: &'static str) -> (String, Arc<AtomicUsize>) {
        let hits = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/invoke", post(fake_invoke))
            .with_state(FakeGateway {
                hits: Arc::clone(&hits),
                status,
                reply,
            });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/invoke"), hits)
    }

    fn sample_request() -> GenerateContentRequest {
        GenerateContentRequest {
            model: "test-model".to_string(),
            system_instruction: Content {
                role: Role::System,
                parts: vec![Part::text("be terse")],
            },
            contents: vec![Content {
                role: Role::User,
                parts: vec![Part::text("hello")],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 10,
                response_mime_type: "application/json".to_string(),
            },
        }
    }

    #[test]
    fn test_request_serializes_with_camel_case_keys() {
        let value = serde_json::to_value(sample_request()).unwrap();
        assert_eq!(value["systemInstruction"]["role"], "system");
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 10);
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_usable_token_rejects_missing_blank_and_placeholder() {
        assert!(matches!(usable_token(None), Err(LlmError::Auth(_))));
        assert!(matches!(usable_token(Some("   ")), Err(LlmError::Auth(_))));
        assert!(matches!(
            usable_token(Some(" your_token_here ")),
            Err(LlmError::Auth(_))
        ));
        assert_eq!(usable_token(Some("  abc  ")).unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_call_returns_gateway_json() {
        let (url, hits) = spawn_gateway(StatusCode::OK, r#"{"output_text":"{}"}"#).await;
        let client = LlmClient::new(url, Some("secret-token".to_string())).unwrap();

        let raw = client.call(&sample_request()).await.unwrap();
        assert_eq!(raw, json!({"output_text": "{}"}));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_call_trims_configured_token() {
        let (url, _hits) = spawn_gateway(StatusCode::OK, "{}").await;
        let client = LlmClient::new(url, Some("  secret-token\n".to_string())).unwrap();
        assert!(client.call(&sample_request()).await.is_ok());
    }

    #[tokio::test]
    async fn test_call_without_token_never_reaches_gateway() {
        let (url, hits) = spawn_gateway(StatusCode::OK, "{}").await;
        let client = LlmClient::new(url, None).unwrap();

        let err = client.call(&sample_request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Auth(_)));
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error_with_body() {
        let (url, _hits) =
            spawn_gateway(StatusCode::SERVICE_UNAVAILABLE, "overloaded, try later").await;
        let client = LlmClient::new(url, Some("secret-token".to_string())).unwrap();

        match client.call(&sample_request()).await.unwrap_err() {
            LlmError::Upstream { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "overloaded, try later");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_success_with_non_json_body_is_decode_error() {
        let (url, _hits) = spawn_gateway(StatusCode::OK, "<html>proxy page</html>").await;
        let client = LlmClient::new(url, Some("secret-token".to_string())).unwrap();
        assert!(matches!(
            client.call(&sample_request()).await.unwrap_err(),
            LlmError::Decode(_)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_gateway_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client =
            LlmClient::new(format!("http://{addr}/invoke"), Some("secret-token".to_string()))
                .unwrap();
        assert!(matches!(
            client.call(&sample_request()).await.unwrap_err(),
            LlmError::Transport(_)
        ));
    }
}
