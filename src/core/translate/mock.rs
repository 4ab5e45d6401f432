//! Mock translation backend for testing.
//!
//! Answers instructions without any network access, deterministically, and
//! records every message it receives so tests can assert on the traffic.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use crate::core::translate::{BackendError, BackendResult, ConversationId, TranslationBackend};
use crate::utils::span_between;

/// How the mock answers an instruction.
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Translate through a source -> target table; unknown text becomes `[text]`.
    Mappings(HashMap<String, String>),
    /// Echo the source text back untranslated.
    Echo,
    /// Fail every request.
    Fail(BackendError),
}

/// A message received by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCall {
    pub conversation: ConversationId,
    pub message: String,
}

/// Mock backend.
///
/// Queued raw replies are returned first, in order; after that the mode answers.
pub struct MockBackend {
    mode: MockMode,
    queued: Mutex<VecDeque<BackendResult<String>>>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockBackend {
    pub fn new(mode: MockMode) -> Self {
        Self {
            mode,
            queued: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_mappings<I, K, V>(mappings: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(MockMode::Mappings(
            mappings
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ))
    }

    /// Queue a raw reply (or failure) to be returned before the mode answers.
    pub async fn queue(&self, reply: BackendResult<String>) {
        self.queued.lock().await.push_back(reply);
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().await.clone()
    }

    fn answer(&self, message: &str) -> BackendResult<String> {
        let source: Map<String, Value> =
            serde_json::from_str(span_between(message, "{", "}")).unwrap_or_default();

        let answers: Map<String, Value> = match &self.mode {
            MockMode::Fail(err) => return Err(err.clone()),
            MockMode::Echo => source,
            MockMode::Mappings(table) => source
                .into_iter()
                .map(|(key, value)| {
                    let text = value.as_str().unwrap_or_default();
                    let translated = table
                        .get(text)
                        .cloned()
                        .unwrap_or_else(|| format!("[{}]", text));
                    (key, Value::String(translated))
                })
                .collect(),
        };

        Ok(format!("{:#}", Value::Object(answers)))
    }
}

#[async_trait]
impl TranslationBackend for MockBackend {
    async fn ask(&self, conversation: ConversationId, message: &str) -> BackendResult<String> {
        self.calls.lock().await.push(MockCall {
            conversation,
            message: message.to_string(),
        });

        if let Some(reply) = self.queued.lock().await.pop_front() {
            return reply;
        }
        self.answer(message)
    }

    fn provider_name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use crate::core::translate::mock::*;
    use crate::core::translate::parse_answers;

    const INSTRUCTION: &str = "Translate the values in json from the japanese rpgm game file a.json to english:\n{\n  \"name\": \"こんにちは\",\n  \"other\": \"村\"\n}\n";

    #[tokio::test]
    async fn test_mappings() {
        let mock = MockBackend::with_mappings([("こんにちは", "Hello")]);
        let reply = mock.ask(ConversationId::fresh(), INSTRUCTION).await.unwrap();
        let answers = parse_answers(&reply).unwrap();
        assert_eq!(answers["name"], "Hello");
        assert_eq!(answers["other"], "[村]");
        assert_eq!(mock.calls().await.len(), 1);
    }

    #[tokio::test]
    async fn test_echo_and_fail() {
        let echo = MockBackend::new(MockMode::Echo);
        let reply = echo.ask(ConversationId::fresh(), INSTRUCTION).await.unwrap();
        assert_eq!(parse_answers(&reply).unwrap()["name"], "こんにちは");

        let failing = MockBackend::new(MockMode::Fail(BackendError::Timeout));
        assert_eq!(
            failing.ask(ConversationId::fresh(), INSTRUCTION).await,
            Err(BackendError::Timeout)
        );
    }

    #[tokio::test]
    async fn test_queued_replies_come_first() {
        let mock = MockBackend::new(MockMode::Echo);
        mock.queue(Ok("raw".to_string())).await;
        let conversation = ConversationId::fresh();
        assert_eq!(mock.ask(conversation, "anything").await.unwrap(), "raw");
        assert_eq!(mock.ask(conversation, "{}").await.unwrap(), "{}");
        assert_eq!(mock.calls().await[1].conversation, conversation);
    }
}
