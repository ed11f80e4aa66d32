//! Together AI provider (OpenAI-compatible chat completions)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{ColloquyError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, Message, ProviderInfo, TokenUsage};

/// Provider for any endpoint speaking the OpenAI `chat/completions` dialect.
///
/// Defaults to Together AI. The model is taken from each request, so one
/// provider serves every model the endpoint hosts.
pub struct TogetherProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl TogetherProvider {
    /// Create a new provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bearer credential; requests are sent unauthenticated when `None`
    /// * `base_url` - API base URL, e.g. `https://api.together.xyz/v1`
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether a credential is attached to requests.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: Option<ChatMessage>,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
    total_tokens: usize,
}

#[derive(Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

#[async_trait]
impl LLMProvider for TogetherProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        let body = ChatRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(
            url = %url,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body);
        if let Some(api_key) = &self.api_key {
            builder = builder.bearer_auth(api_key);
        }

        let response = builder.send().await.map_err(|e| {
            ColloquyError::Completion(format!("Failed to send request to {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(error) = serde_json::from_str::<ApiError>(&text) {
                return Err(ColloquyError::Completion(format!(
                    "API error ({}): {}",
                    error.error.error_type.unwrap_or_else(|| status.to_string()),
                    error.error.message
                )));
            }

            return Err(ColloquyError::Completion(format!(
                "API error ({}): {}",
                status, text
            )));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| {
            ColloquyError::Completion(format!("Failed to parse completion response: {}", e))
        })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ColloquyError::Completion("API returned no choices".to_string()))?
            .message
            .and_then(|m| m.content)
            .ok_or_else(|| {
                ColloquyError::Completion("API returned a choice without content".to_string())
            })?;

        let usage = parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LLMResponse { content, usage })
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: "together".to_string(),
            base_url: Some(self.base_url.clone()),
        }
    }
}
