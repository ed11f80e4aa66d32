//! Conversation Manager

use std::path::Path;
use std::sync::Arc;

use crate::config::ColloquyConfig;
use crate::error::{ColloquyError, Result};
use crate::llm::{LLMProvider, LLMProviderFactory, LLMRequest, Message};
use crate::tokenizer::{Tokenizer, create_tokenizer};

use super::history::ConversationHistory;
use super::persona::{DEFAULT_SYSTEM_MESSAGE, PersonaTable};
use super::store::HistoryStore;
use super::truncation::{TokenBudget, total_tokens};

/// One conversation against a chat-completion provider.
///
/// Owns the message history, the persona table and the token budget. When a
/// history file is configured, the history is restored at construction and
/// rewritten after every appended message; otherwise it lives only as long as
/// the manager.
pub struct ConversationManager {
    provider: Arc<dyn LLMProvider>,
    tokenizer: Box<dyn Tokenizer>,
    personas: PersonaTable,
    system_message: String,
    history: ConversationHistory,
    budget: TokenBudget,
    model: String,
    temperature: f32,
    max_tokens: usize,
    store: Option<HistoryStore>,
}

impl std::fmt::Debug for ConversationManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationManager")
            .field("model", &self.model)
            .field("system_message", &self.system_message)
            .field("messages", &self.history.len())
            .field("token_budget", &self.budget.limit())
            .field("history_file", &self.history_file())
            .finish_non_exhaustive()
    }
}

impl ConversationManager {
    /// Create a manager with the HTTP provider and tokenizer named by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the tokenizer
    /// cannot be loaded.
    pub fn from_config(config: &ColloquyConfig) -> Result<Self> {
        let provider = LLMProviderFactory::create(config);
        let tokenizer = create_tokenizer(config.tokenizer, &config.model)?;
        Self::new(config, provider, tokenizer)
    }

    /// Create a manager with explicit collaborators.
    ///
    /// The system message is, in order of preference, `config.system_message`,
    /// the text of `config.persona`, or the default persona. A system message
    /// that matches no persona is registered as the custom persona.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or names an unknown
    /// persona.
    pub fn new(
        config: &ColloquyConfig,
        provider: Arc<dyn LLMProvider>,
        tokenizer: Box<dyn Tokenizer>,
    ) -> Result<Self> {
        config.validate()?;

        let mut personas = PersonaTable::new();
        let system_message = match (&config.system_message, config.persona) {
            (Some(message), _) if !message.is_empty() => message.clone(),
            (_, Some(persona)) => personas
                .text(persona)
                .ok_or_else(|| ColloquyError::UnknownPersona(persona.name().to_string()))?
                .to_string(),
            _ => DEFAULT_SYSTEM_MESSAGE.to_string(),
        };
        personas.set_custom(system_message.as_str());

        let store = config
            .history_file
            .as_ref()
            .filter(|p| !p.as_os_str().is_empty())
            .map(HistoryStore::new);

        let mut manager = Self {
            provider,
            tokenizer,
            personas,
            history: ConversationHistory::new(system_message.as_str()),
            system_message,
            budget: TokenBudget::new(config.token_budget)?,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            store,
        };

        manager.load_conversation_history();

        Ok(manager)
    }

    /// Messages in conversation order, system message first
    pub fn history(&self) -> &[Message] {
        self.history.messages()
    }

    /// Currently active system message
    pub fn system_message(&self) -> &str {
        &self.system_message
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn token_budget(&self) -> usize {
        self.budget.limit()
    }

    pub fn personas(&self) -> &PersonaTable {
        &self.personas
    }

    /// History file, if this conversation is persisted
    pub fn history_file(&self) -> Option<&Path> {
        self.store.as_ref().map(HistoryStore::path)
    }

    /// Restore history from the history file.
    ///
    /// A missing file, unreadable file or corrupt content resets the history
    /// to the current system message; only the latter two are logged. Does
    /// nothing for an in-memory conversation.
    pub fn load_conversation_history(&mut self) {
        let Some(store) = &self.store else {
            return;
        };

        let loaded = store
            .load()
            .and_then(|messages| messages.map(ConversationHistory::from_messages).transpose());

        match loaded {
            Ok(Some(history)) => {
                tracing::debug!(messages = history.len(), "Restored conversation history");
                self.history = history;
            }
            Ok(None) => {
                self.history.reset(self.system_message.as_str());
            }
            Err(e) => {
                tracing::warn!(
                    path = ?self.history_file(),
                    error = %e,
                    "Error reading the conversation history file, starting fresh"
                );
                self.history.reset(self.system_message.as_str());
            }
        }
    }

    /// Write the full history to the history file; a no-op when in memory.
    pub fn save_conversation_history(&self) -> Result<()> {
        match &self.store {
            Some(store) => store.save(self.history.messages()),
            None => Ok(()),
        }
    }

    /// Switch to a named persona.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::UnknownPersona`] if the name is not known; the
    /// history and system message are left untouched.
    pub fn set_persona(&mut self, name: &str) -> Result<()> {
        let text = self.personas.resolve(name)?.to_string();
        self.history.set_system_message(text.as_str());
        self.system_message = text;
        tracing::info!(persona = %name, "Switched persona");
        Ok(())
    }

    /// Register `text` as the custom persona without activating it.
    ///
    /// Returns whether it was registered; empty text and text that already
    /// belongs to a persona are ignored.
    pub fn set_custom_system_message(&mut self, text: &str) -> bool {
        self.personas.set_custom(text)
    }

    /// Count the tokens in `text` with the model's encoding
    pub fn count_tokens(&self, text: &str) -> Result<usize> {
        self.tokenizer.count_tokens(text)
    }

    /// Tokens across every message in the history
    pub fn total_tokens_used(&self) -> Result<usize> {
        total_tokens(self.history.messages(), self.tokenizer.as_ref())
    }

    /// Evict the oldest non-system messages until the history fits the
    /// budget. Returns how many messages were evicted.
    pub fn enforce_token_budget(&mut self) -> Result<usize> {
        let evicted = self.budget.enforce(&mut self.history, self.tokenizer.as_ref())?;
        Ok(evicted.len())
    }

    /// Reset to the system message alone, persisting the result.
    pub fn clear_history(&mut self) -> Result<()> {
        self.history.reset(self.system_message.as_str());
        self.save_conversation_history()
    }

    /// Send `prompt` with the conversation so far and return the reply.
    ///
    /// `None` for `temperature` or `max_tokens` uses the configured value;
    /// `Some(0.0)` is sent as zero.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::EmptyPrompt`] for an empty prompt, leaving the
    /// history untouched. Provider, tokenizer and storage failures propagate.
    pub async fn chat_completion(
        &mut self,
        prompt: &str,
        temperature: Option<f32>,
        max_tokens: Option<usize>,
    ) -> Result<String> {
        if prompt.is_empty() {
            return Err(ColloquyError::EmptyPrompt);
        }

        let temperature = temperature.unwrap_or(self.temperature);
        let max_tokens = max_tokens.unwrap_or(self.max_tokens);

        self.history.push_user(prompt);
        self.save_conversation_history()?;
        self.enforce_token_budget()?;

        let request = LLMRequest::new(self.model.as_str(), self.history.messages().to_vec())
            .with_temperature(temperature)
            .with_max_tokens(max_tokens);

        let response = self.provider.generate_request(&request).await?;

        if let Some(usage) = &response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                total_tokens = usage.total_tokens,
                "Completion usage"
            );
        }

        self.history.push_assistant(response.content.as_str());
        self.save_conversation_history()?;
        self.enforce_token_budget()?;

        Ok(response.content)
    }
}
