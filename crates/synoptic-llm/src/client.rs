// Text-completion contract and the Claude API client behind it.
//
// The app only needs "send a system + user prompt, get text back". The Claude
// implementation sends `stream: true` to the Messages API and folds the
// Server-Sent Events into a single `Completion`.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest_eventsource::{Event, EventSource, RequestBuilderExt};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use synoptic_core::config::Config;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Contract
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("LLM not configured")]
    NotConfigured,

    #[error("API key not configured")]
    MissingApiKey,

    #[error("API returned status {status}")]
    Api { status: u16 },

    #[error("network error: {0}")]
    Transport(String),

    #[error("stream error: {0}")]
    Stream(String),

    #[error("stream ended without any content")]
    EmptyResponse,
}

/// An opaque text-completion service.
#[async_trait]
pub trait CompletionService: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Streaming Claude Messages API client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            endpoint: ANTHROPIC_API_URL.to_string(),
        }
    }

    /// Point the client at a different Messages endpoint (a local mock in
    /// tests, or a proxy).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn open_stream(&self, request: &CompletionRequest) -> Result<EventSource, LlmError> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": request.max_tokens,
            "stream": true,
            "system": request.system,
            "messages": [{ "role": "user", "content": request.user }]
        });

        self.http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .eventsource()
            .map_err(|e| LlmError::Stream(format!("failed to create event source: {e}")))
    }
}

#[async_trait]
impl CompletionService for ClaudeClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        let mut es = self.open_stream(request)?;
        let mut completion = Completion {
            text: String::new(),
            input_tokens: 0,
            output_tokens: 0,
        };

        while let Some(event) = es.next().await {
            let msg = match event {
                Ok(Event::Open) => {
                    debug!("SSE connection opened");
                    continue;
                }
                Ok(Event::Message(msg)) => msg,
                Err(err) => {
                    es.close();
                    // The server closing the stream after sending text still
                    // counts as a completed answer.
                    if matches!(err, reqwest_eventsource::Error::StreamEnded)
                        && !completion.text.is_empty()
                    {
                        return Ok(completion);
                    }
                    warn!(?err, "SSE stream error");
                    return Err(classify_error(err));
                }
            };

            match msg.event.as_str() {
                "message_start" => match parse_input_tokens(&msg.data) {
                    Some(n) => completion.input_tokens = n,
                    None => warn!("failed to parse input_tokens from message_start"),
                },
                "content_block_delta" => {
                    if let Some(text) = parse_delta_text(&msg.data) {
                        completion.text.push_str(&text);
                    }
                }
                "message_delta" => match parse_output_tokens(&msg.data) {
                    Some(n) => completion.output_tokens = n,
                    None => warn!("failed to parse output_tokens from message_delta"),
                },
                "message_stop" => {
                    debug!(
                        input_tokens = completion.input_tokens,
                        output_tokens = completion.output_tokens,
                        "message_stop"
                    );
                    es.close();
                    break;
                }
                other => debug!(event_type = other, "ignoring SSE event"),
            }
        }

        if completion.text.is_empty() {
            return Err(LlmError::EmptyResponse);
        }
        Ok(completion)
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// Either a configured Claude client or a disabled placeholder.
pub enum LlmClient {
    Active(ClaudeClient),
    Disabled,
}

impl LlmClient {
    /// `Active` when credentials carry a non-empty API key.
    pub fn from_config(config: &Config) -> Self {
        match &config.credentials.anthropic_api_key {
            Some(key) if !key.is_empty() => {
                LlmClient::Active(ClaudeClient::new(key.clone(), config.llm.model.clone()))
            }
            _ => LlmClient::Disabled,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }
}

#[async_trait]
impl CompletionService for LlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        match self {
            LlmClient::Active(client) => client.complete(request).await,
            LlmClient::Disabled => Err(LlmError::NotConfigured),
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// `input_tokens` from a `message_start` event:
/// `{ "message": { "usage": { "input_tokens": N } } }`
pub(crate) fn parse_input_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("message")?
        .get("usage")?
        .get("input_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

/// `delta.text` from a `content_block_delta` event.
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// `usage.output_tokens` from a `message_delta` event.
pub(crate) fn parse_output_tokens(data: &str) -> Option<u32> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("usage")?
        .get("output_tokens")?
        .as_u64()
        .map(|n| n as u32)
}

fn classify_error(err: reqwest_eventsource::Error) -> LlmError {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => LlmError::Api {
            status: status.as_u16(),
        },
        reqwest_eventsource::Error::Transport(e) => LlmError::Transport(e.to_string()),
        other => LlmError::Stream(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
