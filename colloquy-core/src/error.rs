//! Error types for Colloquy operations

/// Result type for Colloquy operations
pub type Result<T> = std::result::Result<T, ColloquyError>;

/// Error types for the conversation manager and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum ColloquyError {
    /// Persona name not present in the persona table
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    /// Empty prompt passed to a completion call
    #[error("Prompt cannot be empty.")]
    EmptyPrompt,

    /// Completion service failed (network, HTTP status, malformed body)
    #[error("Completion error: {0}")]
    Completion(String),

    /// Tokenizer could not be loaded or failed to encode
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Persisted history does not describe a valid conversation
    #[error("Invalid conversation history: {0}")]
    InvalidHistory(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<String> for ColloquyError {
    fn from(s: String) -> Self {
        ColloquyError::Other(s)
    }
}

impl From<&str> for ColloquyError {
    fn from(s: &str) -> Self {
        ColloquyError::Other(s.to_string())
    }
}

impl From<anyhow::Error> for ColloquyError {
    fn from(err: anyhow::Error) -> Self {
        ColloquyError::Other(err.to_string())
    }
}
