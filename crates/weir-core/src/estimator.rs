//! Token cost estimation
//!
//! Admission needs a token cost before the backend has seen the request,
//! so the cost is estimated from the prompt text. The estimate is
//! explicitly best-effort and must not be relied on for billing
//! accuracy; the strategy is pluggable for callers with a real
//! tokenizer.

use crate::messages::{ContentPart, Message, MessageContent};

/// Strategy for estimating the token cost of a pending request
pub trait TokenEstimator: Send + Sync {
    /// Estimate the token cost of one completion request
    fn estimate(&self, system_prompt: &str, messages: &[Message]) -> u64;
}

/// Whitespace word-count estimator
///
/// Counts whitespace-delimited words across the system prompt and every
/// textual content fragment of every message. Image parts contribute
/// nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordCountEstimator;

impl TokenEstimator for WordCountEstimator {
    fn estimate(&self, system_prompt: &str, messages: &[Message]) -> u64 {
        let mut total = system_prompt.split_whitespace().count() as u64;
        for message in messages {
            match &message.content {
                MessageContent::Text(text) => {
                    total += text.split_whitespace().count() as u64;
                }
                MessageContent::Parts(parts) => {
                    for part in parts {
                        if let ContentPart::Text { text } = part {
                            total += text.split_whitespace().count() as u64;
                        }
                    }
                }
            }
        }
        total
    }
}
