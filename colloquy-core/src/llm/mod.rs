//! Chat-completion collaborators
//!
//! The conversation manager never talks HTTP itself. It builds an
//! [`LLMRequest`] from its history and hands it to an [`LLMProvider`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

/// Message role in a conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }
}

/// Request to an LLM provider
#[derive(Debug, Clone, PartialEq)]
pub struct LLMRequest {
    /// Model identifier understood by the provider
    pub model: String,

    /// Messages in the conversation
    pub messages: Vec<Message>,

    /// Temperature for generation (0.0-2.0)
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    pub max_tokens: Option<usize>,
}

impl LLMRequest {
    /// Create a request for `model` carrying the given messages
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Response from an LLM provider
#[derive(Debug, Clone)]
pub struct LLMResponse {
    /// Generated content
    pub content: String,

    /// Token usage information
    pub usage: Option<TokenUsage>,
}

/// Token usage information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenUsage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

/// Trait for chat-completion providers.
///
/// Implementors receive the full conversation and return a single assistant
/// message. Failures are reported as [`crate::error::ColloquyError::Completion`]
/// and are not retried.
#[async_trait]
pub trait LLMProvider: Send + Sync {
    /// Generate the assistant reply for a request.
    ///
    /// # Arguments
    ///
    /// * `request` - Model, sampling parameters and the ordered messages
    ///
    /// # Returns
    ///
    /// The LLM response
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse>;

    /// Get provider information
    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: "unknown".to_string(),
            base_url: None,
        }
    }
}

/// Provider information
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub provider: String,
    pub base_url: Option<String>,
}

pub mod factory;
pub mod providers;

pub use factory::LLMProviderFactory;
pub use providers::{ScriptedProvider, TogetherProvider};
