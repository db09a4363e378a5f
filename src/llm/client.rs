use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use super::config::LLMConfig;

/// Why a completion call produced no answer.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("rate limited (HTTP 429): {body}")]
    RateLimited { body: String },

    #[error("server error (HTTP {status}): {body}")]
    Server { status: u16, body: String },

    #[error("authentication failed (HTTP {status}): {body}")]
    Unauthorized { status: u16, body: String },

    #[error("request rejected (HTTP {status}): {body}")]
    BadRequest { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl CompletionError {
    /// Failures that could plausibly succeed on an identical second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            CompletionError::Timeout
                | CompletionError::Network(_)
                | CompletionError::RateLimited { .. }
                | CompletionError::Server { .. }
        )
    }

    fn from_status(status: StatusCode, body: String) -> Self {
        let code = status.as_u16();
        match status {
            StatusCode::TOO_MANY_REQUESTS => CompletionError::RateLimited { body },
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                CompletionError::Unauthorized { status: code, body }
            }
            s if s.is_server_error() => CompletionError::Server { status: code, body },
            _ => CompletionError::BadRequest { status: code, body },
        }
    }
}

impl From<reqwest::Error> for CompletionError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            CompletionError::Timeout
        } else if e.is_decode() {
            CompletionError::MalformedResponse(e.to_string())
        } else {
            CompletionError::Network(e.to_string())
        }
    }
}

/// A chat completion endpoint taking one message and returning one text.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, CompletionError>;
}

/// `POST {api_url}/chat/completions` against an OpenAI-compatible server.
pub struct HttpCompletionClient {
    client: Client,
    api_url: String,
    api_key: Option<String>,
}

impl HttpCompletionClient {
    pub fn new(config: &LLMConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(&self, model: &str, prompt: &str) -> Result<String, CompletionError> {
        let request_body = json!({
            "model": model,
            "messages": [
                {
                    "role": "system",
                    "content": prompt
                }
            ]
        });

        let mut request = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .json(&request_body);

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        debug!("Sending completion request to {} with model {}", self.api_url, model);
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::from_status(status, body));
        }

        let response_json: Value = response.json().await?;
        extract_content(&response_json)
    }
}

/// Text of the first choice's message.
pub fn extract_content(response_json: &Value) -> Result<String, CompletionError> {
    response_json["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            let response_str = serde_json::to_string_pretty(response_json)
                .unwrap_or_else(|_| "Failed to format response".to_string());
            error!("Invalid response format. Full response: {}", response_str);
            CompletionError::MalformedResponse("missing choices[0].message.content".to_string())
        })
}
