//! # Colloquy - Token-Budgeted Conversations
//!
//! Colloquy keeps one conversation with a chat-completion model:
//! - Personas selecting the system message
//! - A message history bounded by a token budget
//! - Oldest-first eviction that never drops the system message
//! - Optional persistence of the history to a JSON file
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use colloquy_core::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = ColloquyConfig::load()?;
//!     let mut manager = ConversationManager::from_config(&config)?;
//!
//!     manager.set_persona("sassy_assistant")?;
//!     let reply = manager.chat_completion("How's it going?", None, None).await?;
//!     println!("{}", reply);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Collaborators
//!
//! Completions go through the [`llm::LLMProvider`] trait and token counts
//! through [`tokenizer::Tokenizer`]. [`llm::TogetherProvider`] speaks any
//! OpenAI-compatible endpoint; [`llm::ScriptedProvider`] and
//! [`tokenizer::HeuristicTokenizer`] make runs deterministic offline.

pub mod config;
pub mod conversation;
pub mod error;
pub mod llm;
pub mod tokenizer;

/// Current library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ColloquyConfig, ConfigBuilder, TokenizerKind};
    pub use crate::conversation::{
        ConversationHistory, ConversationManager, HistoryStore, Persona, PersonaTable,
        TokenBudget,
    };
    pub use crate::error::{ColloquyError, Result};
    pub use crate::llm::{
        LLMProvider, LLMProviderFactory, LLMRequest, LLMResponse, Message, MessageRole,
        ScriptedProvider, TogetherProvider,
    };
    pub use crate::tokenizer::{HeuristicTokenizer, TiktokenTokenizer, Tokenizer};
}
