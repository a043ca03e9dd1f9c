//! Model identity and capability information

use std::collections::HashMap;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::registry::ProviderId;

/// Capability limits reported for a model
///
/// Used by callers for UI and estimation; nothing in this crate enforces
/// these limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Maximum output tokens the model supports
    pub max_tokens: u32,
    /// Maximum context window (input + output)
    pub context_window: u32,
    /// Whether the model accepts image input
    pub supports_images: bool,
    /// Whether the model can drive computer-use tooling
    pub supports_computer_use: bool,
    /// Whether the model supports prompt caching
    pub supports_prompt_cache: bool,
    /// Input price per million tokens, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_price: Option<f64>,
    /// Output price per million tokens, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_price: Option<f64>,
}

impl Default for ModelInfo {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            context_window: 128_000,
            supports_images: false,
            supports_computer_use: false,
            supports_prompt_cache: false,
            input_price: None,
            output_price: None,
        }
    }
}

/// A model id paired with its capability info
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Model {
    /// Provider-scoped model identifier
    pub id: String,
    /// Capability limits
    pub info: ModelInfo,
}

/// Default model per provider, for registered handlers that do not pick
/// one themselves
static DEFAULT_MODELS: LazyLock<HashMap<ProviderId, Model>> = LazyLock::new(|| {
    let mut m = HashMap::new();

    m.insert(
        ProviderId::Anthropic,
        Model {
            id: "claude-3-5-sonnet-20241022".to_string(),
            info: ModelInfo {
                max_tokens: 8192,
                context_window: 200_000,
                supports_images: true,
                supports_computer_use: true,
                supports_prompt_cache: true,
                input_price: Some(3.0),
                output_price: Some(15.0),
            },
        },
    );
    m.insert(
        ProviderId::OpenAi,
        Model {
            id: "gpt-4o".to_string(),
            info: ModelInfo {
                max_tokens: 16_384,
                context_window: 128_000,
                supports_images: true,
                supports_computer_use: false,
                supports_prompt_cache: false,
                input_price: Some(2.5),
                output_price: Some(10.0),
            },
        },
    );
    m.insert(
        ProviderId::Gemini,
        Model {
            id: "gemini-2.0-flash".to_string(),
            info: ModelInfo {
                max_tokens: 8192,
                context_window: 1_000_000,
                supports_images: true,
                supports_computer_use: false,
                supports_prompt_cache: false,
                input_price: None,
                output_price: None,
            },
        },
    );
    m.insert(
        ProviderId::Ollama,
        Model {
            id: "llama3.1".to_string(),
            info: ModelInfo {
                max_tokens: 4096,
                context_window: 128_000,
                supports_images: false,
                supports_computer_use: false,
                supports_prompt_cache: false,
                input_price: None,
                output_price: None,
            },
        },
    );
    m.insert(
        ProviderId::HumanRelay,
        Model {
            id: "human-relay".to_string(),
            info: ModelInfo {
                max_tokens: 0,
                context_window: 0,
                supports_images: false,
                supports_computer_use: false,
                supports_prompt_cache: false,
                input_price: None,
                output_price: None,
            },
        },
    );

    m
});

/// Look up the default model for a provider
///
/// Providers without a table entry fall back to an anonymous default so
/// the lookup stays total.
pub fn default_model(provider: ProviderId) -> Model {
    DEFAULT_MODELS.get(&provider).cloned().unwrap_or(Model {
        id: provider.to_string(),
        info: ModelInfo::default(),
    })
}
