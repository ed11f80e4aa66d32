//! Conversation Management
//!
//! A single conversation with a chat-completion model, kept within a token
//! budget.
//!
//! # Features
//!
//! - Built-in personas plus one custom system message
//! - History whose first message is always the system message
//! - Oldest-first eviction to stay within the token budget
//! - Optional JSON file persistence, rewritten after every message
//!
//! # Example
//!
//! ```rust,no_run
//! use colloquy_core::config::ColloquyConfig;
//! use colloquy_core::conversation::{ConversationManager, Persona};
//!
//! # async fn run() -> colloquy_core::error::Result<()> {
//! let config = ColloquyConfig::builder()
//!     .persona(Persona::ThoughtfulAssistant)
//!     .history_file("conversation.json")
//!     .build();
//!
//! let mut manager = ConversationManager::from_config(&config)?;
//! let reply = manager.chat_completion("Is it a good weekend for the beach?", None, None).await?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

mod history;
mod manager;
mod persona;
mod store;
mod truncation;

pub use history::ConversationHistory;
pub use manager::ConversationManager;
pub use persona::{DEFAULT_SYSTEM_MESSAGE, Persona, PersonaTable};
pub use store::{HistoryStore, timestamped_file_name};
pub use truncation::{TokenBudget, total_tokens};
