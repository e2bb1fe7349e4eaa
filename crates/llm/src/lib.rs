//! Generation-service infrastructure adapter.
//!
//! Implements the [`pipeline::GenerationService`] trait over an
//! OpenAI-compatible chat-completions endpoint. Additional providers are added
//! as new `impl` blocks in this crate without any changes to the `pipeline`
//! crate.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, request formatting, and response parsing
//! live here. The [`pipeline`] crate sees only [`pipeline::GenerationService`].
//!
//! Each call sends the whole specification as a single user message at a
//! fixed low temperature and returns the first choice's content verbatim.
//! There is no retry: any failure is returned to the orchestrator, which
//! aborts the run.

use async_trait::async_trait;
use pipeline::{GenerationError, GenerationService, Specification};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Default endpoint root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Sampling temperature used for every request.
pub const GENERATION_TEMPERATURE: f32 = 0.3;

/// Connection settings for [`OpenAiProvider`].
#[derive(Debug, Clone, PartialEq)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: GENERATION_TEMPERATURE,
        }
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

// ---------------------------------------------------------------------------
// Provider
// ---------------------------------------------------------------------------

/// Chat-completions client.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    temperature: f32,
}

impl OpenAiProvider {
    /// Creates a provider from `config`.
    ///
    /// # Errors
    ///
    /// [`GenerationError::MissingCredentials`] if no API key is configured,
    /// [`GenerationError::Transport`] if the HTTP client cannot be built.
    pub fn new(config: OpenAiConfig) -> Result<Self, GenerationError> {
        let api_key = config
            .api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or(GenerationError::MissingCredentials)?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model,
            temperature: config.temperature,
        })
    }

    /// The fully-qualified chat-completions URL requests are sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GenerationService for OpenAiProvider {
    #[instrument(
        skip_all,
        fields(kind = ?specification.kind(), model = %self.model, chars = specification.text().len())
    )]
    async fn respond(&self, specification: &Specification) -> Result<String, GenerationError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: specification.text(),
            }],
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = parse_completion(&body)?;
        debug!(response_chars = text.len(), "generation complete");
        Ok(text)
    }
}

/// Extracts the first choice's content from a chat-completions body.
fn parse_completion(body: &str) -> Result<String, GenerationError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| GenerationError::MalformedResponse(e.to_string()))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| GenerationError::MalformedResponse("response has no content".to_string()))
}
