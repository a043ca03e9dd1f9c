//! Streamed response chunk types
//!
//! One completion exchange is observed as an append-only, ordered log of
//! chunks. The serialized shape uses a `type` discriminant so that UI
//! collaborators can switch on it directly.

use serde::{Deserialize, Serialize};

/// One incremental unit of a streamed completion response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamChunk {
    /// Incremental assistant-visible text
    Text { text: String },
    /// Incremental reasoning/thinking text
    Reasoning { reasoning: String },
    /// Token accounting, usually emitted once near the end of the stream
    #[serde(rename_all = "camelCase")]
    Usage {
        input_tokens: u32,
        output_tokens: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cache_write_tokens: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        cache_read_tokens: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        total_cost: Option<f64>,
    },
    /// Raw content passed through without interpretation
    Content { content: String },
}

impl StreamChunk {
    /// Create a text chunk
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a reasoning chunk
    pub fn reasoning(reasoning: impl Into<String>) -> Self {
        Self::Reasoning {
            reasoning: reasoning.into(),
        }
    }

    /// Create a usage chunk with just input/output token counts
    pub fn usage(input_tokens: u32, output_tokens: u32) -> Self {
        Self::Usage {
            input_tokens,
            output_tokens,
            cache_write_tokens: None,
            cache_read_tokens: None,
            total_cost: None,
        }
    }

    /// Create a raw content chunk
    pub fn content(content: impl Into<String>) -> Self {
        Self::Content {
            content: content.into(),
        }
    }
}
