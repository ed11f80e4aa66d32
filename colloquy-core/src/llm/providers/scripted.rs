//! Scripted provider for offline, deterministic runs
//!
//! Replays predetermined replies in order and records every request it
//! receives, so callers can assert on exactly what the manager sent.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::error::{ColloquyError, Result};
use crate::llm::{LLMProvider, LLMRequest, LLMResponse, ProviderInfo};

/// A provider that answers from a fixed script
pub struct ScriptedProvider {
    replies: Arc<RwLock<VecDeque<String>>>,
    call_count: AtomicUsize,
    call_history: Arc<RwLock<Vec<LLMRequest>>>,
}

impl ScriptedProvider {
    /// Create a provider that returns `replies` one per call, in order
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Arc::new(RwLock::new(replies.into_iter().map(Into::into).collect())),
            call_count: AtomicUsize::new(0),
            call_history: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append another reply to the end of the script
    pub async fn push_reply(&self, reply: impl Into<String>) {
        self.replies.write().await.push_back(reply.into());
    }

    /// Get the number of times the provider has been called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Get every request received so far
    pub async fn requests(&self) -> Vec<LLMRequest> {
        self.call_history.read().await.clone()
    }

    /// Get the most recent request
    pub async fn last_request(&self) -> Option<LLMRequest> {
        self.call_history.read().await.last().cloned()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate_request(&self, request: &LLMRequest) -> Result<LLMResponse> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.call_history.write().await.push(request.clone());

        let reply = self.replies.write().await.pop_front().ok_or_else(|| {
            ColloquyError::Completion("Scripted provider has no replies left".to_string())
        })?;

        Ok(LLMResponse {
            content: reply,
            usage: None,
        })
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo {
            provider: "scripted".to_string(),
            base_url: None,
        }
    }
}
