use anyhow::{Context, Result};
use tiktoken_rs::CoreBPE;
use tracing::warn;

/// Estimates the backend cost of a piece of text.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> usize;
}

/// BPE tokenizer of the backend model.
pub struct BpeTokenCounter {
    bpe: CoreBPE,
}

impl BpeTokenCounter {
    /// Tokenizer for `model`, falling back to `cl100k_base` for unknown models.
    pub fn for_model(model: &str) -> Result<Self> {
        let bpe = match tiktoken_rs::get_bpe_from_model(model) {
            Ok(bpe) => bpe,
            Err(err) => {
                warn!("No tokenizer for model '{}' ({}), using cl100k_base", model, err);
                tiktoken_rs::cl100k_base().context("Failed to load cl100k_base tokenizer")?
            }
        };
        Ok(Self { bpe })
    }
}

impl TokenCounter for BpeTokenCounter {
    fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

/// One token per character. Deterministic, for tests and offline estimates.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharTokenCounter;

impl TokenCounter for CharTokenCounter {
    fn count(&self, text: &str) -> usize {
        text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use crate::core::translate::tokens::*;

    #[test]
    fn test_char_counter() {
        assert_eq!(CharTokenCounter.count("はい"), 2);
        assert_eq!(CharTokenCounter.count(""), 0);
    }

    #[test]
    fn test_bpe_counter_for_model() {
        let counter = BpeTokenCounter::for_model("gpt-3.5-turbo").unwrap();
        assert_eq!(counter.count("hello world"), 2);
        assert_eq!(counter.count(""), 0);
    }

    #[test]
    fn test_bpe_counter_falls_back_for_unknown_model() {
        let known = BpeTokenCounter::for_model("gpt-4").unwrap();
        let fallback = BpeTokenCounter::for_model("no-such-model").unwrap();
        let text = "Translate the values in json: {\"name\": \"こんにちは\"}";
        assert_eq!(fallback.count(text), known.count(text));
        assert!(fallback.count(text) > 0);
    }
}
