//! Factory for creating LLM providers from configuration

use std::sync::Arc;

use crate::config::{API_KEY_ENV, ColloquyConfig};
use crate::llm::LLMProvider;
use crate::llm::providers::together::TogetherProvider;

/// Factory for creating LLM providers
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create the chat-completions provider described by `config`
    pub fn create(config: &ColloquyConfig) -> Arc<dyn LLMProvider> {
        let api_key = config.api_key.clone().filter(|k| !k.is_empty());

        if api_key.is_none() {
            tracing::warn!(
                "No API key configured; set {} or COLLOQUY_API_KEY",
                API_KEY_ENV
            );
        }

        Arc::new(TogetherProvider::new(api_key, config.base_url.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_uses_configured_endpoint() {
        let config = ColloquyConfig::builder()
            .api_key("k")
            .base_url("http://localhost:9999/v1")
            .build();

        let provider = LLMProviderFactory::create(&config);
        let info = provider.provider_info();
        assert_eq!(info.provider, "together");
        assert_eq!(info.base_url.as_deref(), Some("http://localhost:9999/v1"));
    }
}
