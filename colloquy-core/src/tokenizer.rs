//! Token counting
//!
//! The manager measures its history through the [`Tokenizer`] trait. The
//! BPE-backed implementation follows the model name and falls back to
//! `cl100k_base` for models tiktoken does not know, which covers most
//! open-weight models served behind OpenAI-compatible endpoints.

use tiktoken_rs::CoreBPE;

use crate::config::TokenizerKind;
use crate::error::{ColloquyError, Result};

/// Encoding used when the model is not recognised
pub const FALLBACK_ENCODING: &str = "cl100k_base";

/// Trait for token counters
pub trait Tokenizer: Send + Sync {
    /// Count the tokens in `text`
    fn count_tokens(&self, text: &str) -> Result<usize>;

    /// Name of the encoding in use
    fn encoding(&self) -> &str;
}

/// BPE token counter backed by tiktoken
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
    encoding: String,
}

impl TiktokenTokenizer {
    /// Load the encoding for `model`, falling back to `cl100k_base`.
    ///
    /// # Errors
    ///
    /// Returns an error if even the fallback encoding cannot be loaded.
    pub fn for_model(model: &str) -> Result<Self> {
        match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => Ok(Self {
                bpe,
                encoding: format!("model:{}", model),
            }),
            Err(e) => {
                tracing::debug!(
                    model = %model,
                    error = %e,
                    "Model unknown to tiktoken, using {}",
                    FALLBACK_ENCODING
                );
                Self::cl100k_base()
            }
        }
    }

    /// Load the `cl100k_base` encoding directly.
    pub fn cl100k_base() -> Result<Self> {
        let bpe = tiktoken_rs::cl100k_base().map_err(|e| {
            ColloquyError::Tokenizer(format!("Failed to load {}: {}", FALLBACK_ENCODING, e))
        })?;
        Ok(Self {
            bpe,
            encoding: FALLBACK_ENCODING.to_string(),
        })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(self.bpe.encode_with_special_tokens(text).len())
    }

    fn encoding(&self) -> &str {
        &self.encoding
    }
}

/// Fast approximation: one token per `chars_per_token` bytes, rounded up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeuristicTokenizer {
    chars_per_token: usize,
}

impl HeuristicTokenizer {
    pub fn new(chars_per_token: usize) -> Self {
        Self {
            chars_per_token: chars_per_token.max(1),
        }
    }
}

impl Default for HeuristicTokenizer {
    fn default() -> Self {
        Self::new(4)
    }
}

impl Tokenizer for HeuristicTokenizer {
    fn count_tokens(&self, text: &str) -> Result<usize> {
        Ok(text.len().div_ceil(self.chars_per_token))
    }

    fn encoding(&self) -> &str {
        "heuristic"
    }
}

/// Build the tokenizer selected by configuration
pub fn create_tokenizer(kind: TokenizerKind, model: &str) -> Result<Box<dyn Tokenizer>> {
    match kind {
        TokenizerKind::Tiktoken => Ok(Box::new(TiktokenTokenizer::for_model(model)?)),
        TokenizerKind::Heuristic => Ok(Box::new(HeuristicTokenizer::default())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristic_counts() {
        let tokenizer = HeuristicTokenizer::default();
        assert_eq!(tokenizer.count_tokens("").unwrap(), 0);
        assert_eq!(tokenizer.count_tokens("twelve chars").unwrap(), 3);
        assert_eq!(tokenizer.count_tokens("abcde").unwrap(), 2);
    }

    #[test]
    fn test_heuristic_minimum_ratio() {
        let tokenizer = HeuristicTokenizer::new(0);
        assert_eq!(tokenizer.count_tokens("abc").unwrap(), 3);
    }

    #[test]
    fn test_unknown_model_falls_back() {
        let tokenizer =
            TiktokenTokenizer::for_model("meta-llama/Llama-3.3-70B-Instruct-Turbo-Free").unwrap();
        assert_eq!(tokenizer.encoding(), FALLBACK_ENCODING);

        let count = tokenizer.count_tokens("Hello, world!").unwrap();
        assert!(count > 0);
        assert!(count < "Hello, world!".len());
    }

    #[test]
    fn test_known_model_uses_its_encoding() {
        let tokenizer = TiktokenTokenizer::for_model("gpt-4").unwrap();
        assert_eq!(tokenizer.encoding(), "model:gpt-4");
        assert_eq!(tokenizer.count_tokens("").unwrap(), 0);
    }

    #[test]
    fn test_create_tokenizer() {
        let heuristic = create_tokenizer(TokenizerKind::Heuristic, "anything").unwrap();
        assert_eq!(heuristic.encoding(), "heuristic");

        let bpe = create_tokenizer(TokenizerKind::Tiktoken, "unknown-model").unwrap();
        assert_eq!(bpe.encoding(), FALLBACK_ENCODING);
    }
}
