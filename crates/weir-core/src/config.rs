//! Dispatch configuration surface

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{WeirError, WeirResult};

/// Rate limit settings for one dispatch configuration
///
/// Absent ceilings mean unlimited for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitSettings {
    /// Whether the rate-limiting dispatcher wraps the handler at all
    #[serde(default)]
    pub enabled: bool,
    /// Requests-per-minute ceiling
    #[serde(default)]
    pub requests_per_minute: Option<u32>,
    /// Tokens-per-minute ceiling
    #[serde(default)]
    pub tokens_per_minute: Option<u32>,
}

/// Configuration consumed by the registry and dispatcher
///
/// Provider-specific options (API keys, base URLs, deployment names)
/// ride in the untyped `options` map; each registered handler factory
/// picks out what it understands.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Provider identifier; unknown values resolve to the default provider
    pub provider: String,
    /// Model override, where the handler supports one
    #[serde(default)]
    pub model: Option<String>,
    /// Rate limit settings
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
    /// Provider-specific options
    #[serde(default)]
    pub options: HashMap<String, serde_json::Value>,
}

impl DispatchConfig {
    /// Create a configuration for the given provider
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            ..Self::default()
        }
    }

    /// Set the model override
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Enable rate limiting with the given ceilings
    pub fn with_rate_limit(
        mut self,
        requests_per_minute: Option<u32>,
        tokens_per_minute: Option<u32>,
    ) -> Self {
        self.rate_limit = RateLimitSettings {
            enabled: true,
            requests_per_minute,
            tokens_per_minute,
        };
        self
    }

    /// Set a provider-specific option
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.options.insert(key.into(), value.into());
        self
    }

    /// Fetch a provider-specific string option
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(|value| value.as_str())
    }

    /// Validate the configuration
    ///
    /// A ceiling of zero would make every admission wait forever, so it
    /// is rejected here rather than looped on at dispatch time.
    pub fn validate(&self) -> WeirResult<()> {
        if self.provider.trim().is_empty() {
            return Err(WeirError::config("provider must not be empty"));
        }
        if self.rate_limit.enabled {
            if self.rate_limit.requests_per_minute == Some(0) {
                return Err(WeirError::config("requests_per_minute must be positive"));
            }
            if self.rate_limit.tokens_per_minute == Some(0) {
                return Err(WeirError::config("tokens_per_minute must be positive"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_round_trip() {
        let config = DispatchConfig::new("openrouter")
            .with_model("anthropic/claude-3.5-sonnet")
            .with_rate_limit(Some(30), Some(90_000))
            .with_option("apiKey", "sk-test");

        assert!(config.validate().is_ok());
        assert_eq!(config.option_str("apiKey"), Some("sk-test"));

        let json = serde_json::to_string(&config).unwrap();
        let back: DispatchConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.provider, "openrouter");
        assert_eq!(back.rate_limit.requests_per_minute, Some(30));
    }

    #[test]
    fn zero_ceilings_are_rejected() {
        let config = DispatchConfig::new("anthropic").with_rate_limit(Some(0), None);
        assert!(matches!(
            config.validate(),
            Err(WeirError::Config { .. })
        ));

        let config = DispatchConfig::new("anthropic").with_rate_limit(None, Some(0));
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_ceilings_allowed_when_limiting_disabled() {
        let mut config = DispatchConfig::new("anthropic");
        config.rate_limit.requests_per_minute = Some(0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_provider_is_rejected() {
        assert!(DispatchConfig::new("  ").validate().is_err());
    }
}
