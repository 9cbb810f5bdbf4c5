//! OpenAI-compatible chat completions provider.
//!
//! Calls `{base_url}/chat/completions` with a `system` and a `user` message.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use super::{CompletionError, CompletionProvider, CompletionRequest};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Connection settings for the completion service.
#[derive(Clone)]
pub struct OpenAiConfig {
    /// Bearer credential; `None` leaves the client unusable until configured.
    pub api_key: Option<String>,
    pub base_url: Url,
    pub model: String,
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url.as_str())
            .field("model", &self.model)
            .finish()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: Option<String>,
}

/// Completion provider over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
    endpoint: String,
}

impl OpenAiClient {
    pub fn new(config: OpenAiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: OpenAiConfig) -> Self {
        let endpoint = format!(
            "{}/chat/completions",
            config.base_url.as_str().trim_end_matches('/')
        );
        Self {
            client,
            config,
            endpoint,
        }
    }

    /// Whether an API credential is present.
    pub fn is_configured(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    async fn send(&self, api_key: &str, request: &CompletionRequest) -> Result<String, CompletionError> {
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_text,
                },
            ],
            max_tokens: request.max_tokens,
        };

        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CompletionError::upstream("RequestError", e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(CompletionError::upstream(
                "UpstreamStatus",
                format!("{status} {text}"),
            ));
        }

        let data: ChatResponse = resp
            .json()
            .await
            .map_err(|e| CompletionError::upstream("DecodeError", e.to_string()))?;

        let content = data
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CompletionError::upstream("EmptyResponse", "no choices in reply"))?;

        Ok(content.trim().to_string())
    }
}

#[async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CompletionError::MissingCredential)?;

        debug!(model = %self.config.model, max_tokens = request.max_tokens, "sending completion request");

        match tokio::time::timeout(request.timeout, self.send(api_key, request)).await {
            Ok(result) => result,
            Err(_) => Err(CompletionError::Timeout(request.timeout)),
        }
    }
}
