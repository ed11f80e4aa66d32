//! Message History Management

use crate::error::{ColloquyError, Result};
use crate::llm::{Message, MessageRole};

/// Ordered conversation history whose first entry is the system message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    /// Create a history holding only the system message
    pub fn new(system_message: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_message)],
        }
    }

    /// Rebuild a history from persisted messages.
    ///
    /// # Errors
    ///
    /// Returns [`ColloquyError::InvalidHistory`] if `messages` is empty or does
    /// not start with a system message.
    pub fn from_messages(messages: Vec<Message>) -> Result<Self> {
        match messages.first() {
            None => Err(ColloquyError::InvalidHistory(
                "history contains no messages".to_string(),
            )),
            Some(first) if first.role != MessageRole::System => {
                Err(ColloquyError::InvalidHistory(format!(
                    "first message has role '{}', expected 'system'",
                    first.role
                )))
            }
            Some(_) => Ok(Self { messages }),
        }
    }

    /// All messages in conversation order
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Content of the leading system message
    pub fn system_message(&self) -> Option<&str> {
        self.messages
            .first()
            .filter(|m| m.role == MessageRole::System)
            .map(|m| m.content.as_str())
    }

    /// Rewrite the leading system message, inserting one if it is missing
    pub fn set_system_message(&mut self, content: impl Into<String>) {
        let content = content.into();
        match self.messages.first_mut() {
            Some(first) if first.role == MessageRole::System => first.content = content,
            _ => self.messages.insert(0, Message::system(content)),
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Remove the oldest non-system message
    pub fn evict_oldest(&mut self) -> Option<Message> {
        if self.messages.len() > 1 {
            Some(self.messages.remove(1))
        } else {
            None
        }
    }

    /// Drop everything except a fresh system message
    pub fn reset(&mut self, system_message: impl Into<String>) {
        self.messages.clear();
        self.messages.push(Message::system(system_message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_history_has_system_message() {
        let history = ConversationHistory::new("You are helpful");
        assert_eq!(history.len(), 1);
        assert_eq!(history.system_message(), Some("You are helpful"));
    }

    #[test]
    fn test_push_and_order() {
        let mut history = ConversationHistory::new("sys");
        history.push_user("Hello");
        history.push_assistant("Hi!");

        let roles: Vec<_> = history.messages().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            [MessageRole::System, MessageRole::User, MessageRole::Assistant]
        );
    }

    #[test]
    fn test_evict_oldest_skips_system() {
        let mut history = ConversationHistory::new("sys");
        history.push_user("m1");
        history.push_assistant("m2");

        assert_eq!(history.evict_oldest(), Some(Message::user("m1")));
        assert_eq!(history.evict_oldest(), Some(Message::assistant("m2")));
        assert_eq!(history.evict_oldest(), None);
        assert_eq!(history.messages(), &[Message::system("sys")]);
    }

    #[test]
    fn test_set_system_message_rewrites_first() {
        let mut history = ConversationHistory::new("old");
        history.push_user("q");
        history.set_system_message("new");

        assert_eq!(history.len(), 2);
        assert_eq!(history.system_message(), Some("new"));
    }

    #[test]
    fn test_set_system_message_inserts_when_missing() {
        let mut history = ConversationHistory {
            messages: vec![Message::user("orphan")],
        };
        history.set_system_message("sys");

        assert_eq!(history.messages()[0], Message::system("sys"));
        assert_eq!(history.messages()[1], Message::user("orphan"));

        let mut empty = ConversationHistory { messages: Vec::new() };
        empty.set_system_message("sys");
        assert_eq!(empty.messages(), &[Message::system("sys")]);
    }

    #[test]
    fn test_from_messages_validation() {
        assert!(ConversationHistory::from_messages(Vec::new()).is_err());
        assert!(ConversationHistory::from_messages(vec![Message::user("x")]).is_err());

        let history =
            ConversationHistory::from_messages(vec![Message::system("s"), Message::user("u")])
                .unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_reset() {
        let mut history = ConversationHistory::new("sys");
        history.push_user("q");
        history.reset("fresh");
        assert_eq!(history.messages(), &[Message::system("fresh")]);
    }
}
