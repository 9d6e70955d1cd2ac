//! Cohere generative bridge: last resort of the cascade.
//!
//! Sends the raw query to the Cohere generate API with fixed parameters and
//! returns the first completion, trimmed. Failures are explicit
//! [`GenerativeError`] variants; the resolver decides what the caller sees
//! (a degraded-service answer, never a raw transport error).
//!
//! API key: `COHERE_API_KEY` in `.env`. Default model: `command-xlarge-nightly`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const COHERE_API_BASE: &str = "https://api.cohere.ai/v1";
const DEFAULT_MODEL: &str = "command-xlarge-nightly";

/// Fixed generation parameters: bounded output, moderate randomness, stop at
/// the first newline.
const MAX_TOKENS: u32 = 3000;
const TEMPERATURE: f32 = 0.9;

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    max_tokens: u32,
    temperature: f32,
    stop_sequences: Vec<String>,
}

#[derive(Deserialize)]
struct GenerateResponse {
    generations: Vec<Generation>,
}

#[derive(Deserialize)]
struct Generation {
    text: String,
}

/// Errors from the generative stage.
#[derive(Debug, thiserror::Error)]
pub enum GenerativeError {
    #[error("Generative service not configured (set COHERE_API_KEY)")]
    Unconfigured,

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("Service returned no completion")]
    EmptyCompletion,
}

/// Seam for the resolver: the generative stage as a mockable dependency.
#[async_trait]
pub trait GenerativeSource: Send + Sync {
    async fn complete(&self, query: &str) -> Result<String, GenerativeError>;
}

/// Live Cohere client. One reqwest client with a bounded timeout; the base
/// URL and model are overridable for tests.
pub struct CohereBridge {
    api_key: String,
    model: String,
    api_base: String,
    client: reqwest::Client,
}

impl CohereBridge {
    /// Create a bridge using `COHERE_API_KEY` from the environment.
    /// Returns `None` if no key is found.
    pub fn from_env(timeout: Duration) -> Option<Self> {
        let key = std::env::var("COHERE_API_KEY").ok()?.trim().to_string();
        if key.is_empty() {
            return None;
        }
        Some(Self::new(key, timeout))
    }

    /// Create a bridge with an explicit API key.
    pub fn new(api_key: String, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            api_key: api_key.trim().to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_base: COHERE_API_BASE.to_string(),
            client,
        }
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    /// Point the bridge at a different API base (tests).
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl GenerativeSource for CohereBridge {
    async fn complete(&self, query: &str) -> Result<String, GenerativeError> {
        let url = format!("{}/generate", self.api_base);
        let body = GenerateRequest {
            model: self.model.clone(),
            prompt: query.to_string(),
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            stop_sequences: vec!["\n".to_string()],
        };

        let res = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !res.status().is_success() {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            return Err(GenerativeError::Api { status, body });
        }

        let parsed: GenerateResponse = res.json().await?;
        let text = parsed
            .generations
            .first()
            .map(|g| g.text.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(GenerativeError::EmptyCompletion)?;
        Ok(text)
    }
}

/// Stand-in when no API key is configured at startup: every call reports
/// [`GenerativeError::Unconfigured`] and the resolver degrades gracefully.
pub struct UnconfiguredGenerative;

#[async_trait]
impl GenerativeSource for UnconfiguredGenerative {
    async fn complete(&self, _query: &str) -> Result<String, GenerativeError> {
        Err(GenerativeError::Unconfigured)
    }
}
