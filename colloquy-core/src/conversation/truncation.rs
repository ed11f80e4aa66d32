//! Token budget enforcement

use crate::error::{ColloquyError, Result};
use crate::llm::Message;
use crate::tokenizer::Tokenizer;

use super::history::ConversationHistory;

/// Sum of token counts over `messages`
pub fn total_tokens(messages: &[Message], tokenizer: &dyn Tokenizer) -> Result<usize> {
    messages
        .iter()
        .map(|m| tokenizer.count_tokens(&m.content))
        .sum()
}

/// Ceiling on the tokens a history may hold.
///
/// Enforcement evicts the oldest non-system message until the history fits
/// or only the system message remains. The system message is never evicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    limit: usize,
}

impl TokenBudget {
    /// Create a budget.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `limit` is zero.
    pub fn new(limit: usize) -> Result<Self> {
        if limit == 0 {
            return Err(ColloquyError::Configuration(
                "token budget must be greater than zero".to_string(),
            ));
        }
        Ok(Self { limit })
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Evict messages from `history` until it fits, returning the evicted
    /// messages oldest first.
    pub fn enforce(
        &self,
        history: &mut ConversationHistory,
        tokenizer: &dyn Tokenizer,
    ) -> Result<Vec<Message>> {
        let mut used = total_tokens(history.messages(), tokenizer)?;
        let mut evicted = Vec::new();

        while used > self.limit && history.len() > 1 {
            let Some(message) = history.evict_oldest() else {
                break;
            };
            used -= tokenizer.count_tokens(&message.content)?;
            evicted.push(message);
        }

        if !evicted.is_empty() {
            tracing::debug!(
                evicted = evicted.len(),
                remaining_tokens = used,
                limit = self.limit,
                "Evicted messages to fit token budget"
            );
        }

        Ok(evicted)
    }
}
