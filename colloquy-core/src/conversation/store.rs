//! Flat-file persistence for conversation history
//!
//! The file holds the whole history as a pretty-printed JSON array of
//! `{role, content}` records and is rewritten in full on every save.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::llm::Message;

/// Name for a new session file created at `at`
pub fn timestamped_file_name(at: DateTime<Local>) -> String {
    format!("conversation_history_{}.json", at.format("%Y%m%d_%H%M%S"))
}

/// History file on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStore {
    path: PathBuf,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store for a new session file in `dir`, named after the current time
    pub fn timestamped(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(timestamped_file_name(Local::now())))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored messages.
    ///
    /// Returns `Ok(None)` when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an IO error for unreadable files and a serialization error for
    /// content that is not a list of messages.
    pub fn load(&self) -> Result<Option<Vec<Message>>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let messages: Vec<Message> = serde_json::from_str(&content)?;
        Ok(Some(messages))
    }

    /// Overwrite the file with `messages`.
    pub fn save(&self, messages: &[Message]) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        messages.serialize(&mut serializer)?;

        std::fs::write(&self.path, buf)?;

        tracing::debug!(
            path = %self.path.display(),
            messages = messages.len(),
            "Saved conversation history"
        );
        Ok(())
    }
}
