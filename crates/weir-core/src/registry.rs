//! Provider identifiers and handler registry

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::config::DispatchConfig;
use crate::error::{WeirError, WeirResult};
use crate::handler::BackendHandler;

/// Closed set of supported provider identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Anthropic,
    OpenRouter,
    Bedrock,
    Vertex,
    OpenAi,
    Ollama,
    LmStudio,
    Gemini,
    OpenAiNative,
    DeepSeek,
    Requesty,
    Together,
    Qwen,
    Doubao,
    Mistral,
    LiteLlm,
    AskSage,
    XAi,
    SambaNova,
    HumanRelay,
}

impl ProviderId {
    /// All known provider identifiers
    pub const ALL: [ProviderId; 20] = [
        ProviderId::Anthropic,
        ProviderId::OpenRouter,
        ProviderId::Bedrock,
        ProviderId::Vertex,
        ProviderId::OpenAi,
        ProviderId::Ollama,
        ProviderId::LmStudio,
        ProviderId::Gemini,
        ProviderId::OpenAiNative,
        ProviderId::DeepSeek,
        ProviderId::Requesty,
        ProviderId::Together,
        ProviderId::Qwen,
        ProviderId::Doubao,
        ProviderId::Mistral,
        ProviderId::LiteLlm,
        ProviderId::AskSage,
        ProviderId::XAi,
        ProviderId::SambaNova,
        ProviderId::HumanRelay,
    ];

    /// The identifier string as it appears in configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Anthropic => "anthropic",
            ProviderId::OpenRouter => "openrouter",
            ProviderId::Bedrock => "bedrock",
            ProviderId::Vertex => "vertex",
            ProviderId::OpenAi => "openai",
            ProviderId::Ollama => "ollama",
            ProviderId::LmStudio => "lmstudio",
            ProviderId::Gemini => "gemini",
            ProviderId::OpenAiNative => "openai-native",
            ProviderId::DeepSeek => "deepseek",
            ProviderId::Requesty => "requesty",
            ProviderId::Together => "together",
            ProviderId::Qwen => "qwen",
            ProviderId::Doubao => "doubao",
            ProviderId::Mistral => "mistral",
            ProviderId::LiteLlm => "litellm",
            ProviderId::AskSage => "asksage",
            ProviderId::XAi => "xai",
            ProviderId::SambaNova => "sambanova",
            ProviderId::HumanRelay => "human-relay",
        }
    }

    /// Parse an identifier string; `None` for unrecognized identifiers
    pub fn parse(s: &str) -> Option<Self> {
        ProviderId::ALL
            .iter()
            .copied()
            .find(|id| id.as_str() == s.to_lowercase())
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Factory that builds a handler instance from configuration
pub type HandlerFactory =
    Arc<dyn Fn(&DispatchConfig) -> WeirResult<Arc<dyn BackendHandler>> + Send + Sync>;

/// Maps provider identifiers to registered handler factories
///
/// The wire integrations live outside this crate and register themselves
/// here. Resolution is total over identifier strings: unrecognized
/// identifiers, and known identifiers with no registered factory, fall
/// back to the designated default provider.
pub struct HandlerRegistry {
    factories: HashMap<ProviderId, HandlerFactory>,
    default_id: ProviderId,
}

impl HandlerRegistry {
    /// Create a registry defaulting to the anthropic provider
    pub fn new() -> Self {
        Self::with_default(ProviderId::Anthropic)
    }

    /// Create a registry with an explicit default provider
    pub fn with_default(default_id: ProviderId) -> Self {
        Self {
            factories: HashMap::new(),
            default_id,
        }
    }

    /// The provider unknown identifiers resolve to
    pub fn default_provider(&self) -> ProviderId {
        self.default_id
    }

    /// Register a handler factory for a provider
    pub fn register<F>(&mut self, id: ProviderId, factory: F) -> &mut Self
    where
        F: Fn(&DispatchConfig) -> WeirResult<Arc<dyn BackendHandler>> + Send + Sync + 'static,
    {
        self.factories.insert(id, Arc::new(factory));
        self
    }

    /// Build the handler for a configuration
    ///
    /// Fails only when not even the default provider has a registered
    /// factory, or when the chosen factory itself rejects the options.
    pub fn resolve(&self, config: &DispatchConfig) -> WeirResult<Arc<dyn BackendHandler>> {
        let id = ProviderId::parse(&config.provider).unwrap_or(self.default_id);
        let factory = self
            .factories
            .get(&id)
            .or_else(|| self.factories.get(&self.default_id))
            .ok_or_else(|| {
                WeirError::config(format!(
                    "no handler registered for provider '{}' or default '{}'",
                    id, self.default_id
                ))
            })?;
        debug!(provider = %id, requested = %config.provider, "resolved backend handler");
        factory(config)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Model, ModelInfo};
    use crate::stream::ChunkStream;
    use async_trait::async_trait;

    struct StubHandler {
        model_id: &'static str,
    }

    #[async_trait]
    impl BackendHandler for StubHandler {
        async fn stream_completion(
            &self,
            _system_prompt: &str,
            _messages: &[crate::messages::Message],
        ) -> WeirResult<ChunkStream> {
            let (mut tx, rx) = ChunkStream::channel();
            tx.complete();
            Ok(rx)
        }

        fn current_model(&self) -> Model {
            Model {
                id: self.model_id.to_string(),
                info: ModelInfo::default(),
            }
        }
    }

    fn stub(model_id: &'static str) -> HandlerFactory {
        Arc::new(move |_config| Ok(Arc::new(StubHandler { model_id }) as Arc<dyn BackendHandler>))
    }

    #[test]
    fn identifier_strings_round_trip() {
        for id in ProviderId::ALL {
            assert_eq!(ProviderId::parse(id.as_str()), Some(id));
        }
        assert_eq!(ProviderId::parse("OpenAI-Native"), Some(ProviderId::OpenAiNative));
        assert_eq!(ProviderId::parse("made-up"), None);
    }

    #[test]
    fn known_provider_resolves_to_its_factory() {
        let mut registry = HandlerRegistry::new();
        registry.register(ProviderId::Anthropic, {
            let f = stub("claude");
            move |c| f(c)
        });
        registry.register(ProviderId::Ollama, {
            let f = stub("llama");
            move |c| f(c)
        });

        let handler = registry.resolve(&DispatchConfig::new("ollama")).unwrap();
        assert_eq!(handler.current_model().id, "llama");
    }

    #[test]
    fn unknown_identifier_falls_back_to_default() {
        let mut registry = HandlerRegistry::new();
        registry.register(ProviderId::Anthropic, {
            let f = stub("claude");
            move |c| f(c)
        });

        let handler = registry
            .resolve(&DispatchConfig::new("not-a-provider"))
            .unwrap();
        assert_eq!(handler.current_model().id, "claude");
    }

    #[test]
    fn known_identifier_without_factory_falls_back_to_default() {
        let mut registry = HandlerRegistry::new();
        registry.register(ProviderId::Anthropic, {
            let f = stub("claude");
            move |c| f(c)
        });

        let handler = registry.resolve(&DispatchConfig::new("mistral")).unwrap();
        assert_eq!(handler.current_model().id, "claude");
    }

    #[test]
    fn empty_registry_reports_config_error() {
        let registry = HandlerRegistry::new();
        let err = registry
            .resolve(&DispatchConfig::new("anthropic"))
            .err()
            .unwrap();
        assert!(matches!(err, WeirError::Config { .. }));
    }
}
