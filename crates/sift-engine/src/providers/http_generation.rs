//! Chat-completions client implementing [`IGenerationService`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sift_core::config::GenerationConfig;
use sift_core::models::Prompt;
use sift_core::traits::IGenerationService;
use sift_core::{SiftError, SiftResult};
use tracing::{debug, warn};

use super::api_key_from_env;

pub struct HttpGenerationService {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub(crate) struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

impl HttpGenerationService {
    pub fn new(config: &GenerationConfig) -> SiftResult<Self> {
        let client = reqwest::Client::builder()
            .gzip(true)
            .build()
            .map_err(|e| SiftError::generation_unavailable(format!("http client: {e}")))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            api_key: api_key_from_env(&config.api_key_env),
        })
    }

    /// Preamble becomes the system message, every other section the user message.
    pub(crate) fn request_for(&self, prompt: &Prompt) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(preamble) = prompt.preamble() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: preamble.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.render_body(),
        });
        ChatRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

/// First choice's content, trimmed.
pub(crate) fn parse_completion(body: &str) -> SiftResult<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| SiftError::generation_unavailable(format!("malformed response: {e}")))?;
    response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content.trim().to_string())
        .ok_or_else(|| SiftError::generation_unavailable("response had no choices"))
}

#[async_trait]
impl IGenerationService for HttpGenerationService {
    async fn generate(&self, prompt: &Prompt) -> SiftResult<String> {
        let mut request = self.client.post(&self.endpoint).json(&self.request_for(prompt));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request
            .send()
            .await
            .map_err(|e| SiftError::generation_unavailable(format!("http error: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SiftError::generation_unavailable(format!("reading response: {e}")))?;
        if !status.is_success() {
            warn!(status = %status, "generation request failed");
            return Err(SiftError::generation_unavailable(format!(
                "generation service returned {status}"
            )));
        }
        let text = parse_completion(&body)?;
        debug!(model = %self.model, chars = text.len(), "completion received");
        Ok(text)
    }

    fn name(&self) -> &str {
        &self.model
    }
}
