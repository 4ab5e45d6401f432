use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use thiserror::Error;

static NEXT_CONVERSATION: AtomicU64 = AtomicU64::new(1);

/// Identifier of one backend conversation. Every question opens a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConversationId(u64);

impl ConversationId {
    pub fn fresh() -> Self {
        Self(NEXT_CONVERSATION.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conv-{}", self.0)
    }
}

/// Transport-level failure of a backend round-trip.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP {status}")]
    Http { status: u16 },

    #[error("request failed: {0}")]
    Transport(String),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// A conversational translation backend.
///
/// Messages sent with the same [`ConversationId`] belong to one conversation,
/// so a follow-up message sees the earlier exchange.
#[async_trait]
pub trait TranslationBackend: Send + Sync {
    /// Send one message and return the raw reply text.
    async fn ask(&self, conversation: ConversationId, message: &str) -> BackendResult<String>;

    /// Short name for logs.
    fn provider_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use crate::core::translate::backend::*;

    #[test]
    fn test_conversations_are_fresh() {
        let first = ConversationId::fresh();
        let second = ConversationId::fresh();
        assert_ne!(first, second);
        assert!(first.to_string().starts_with("conv-"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(BackendError::Http { status: 429 }.to_string(), "HTTP 429");
        assert_eq!(
            BackendError::Transport("connection reset".to_string()).to_string(),
            "request failed: connection reset"
        );
    }
}
