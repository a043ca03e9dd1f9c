//! Error types for the dispatch layer

use thiserror::Error;

/// Result type alias for Weir operations
pub type WeirResult<T> = Result<T, WeirError>;

/// Main error type for the dispatch layer
///
/// The taxonomy mirrors how failures surface to callers:
/// - `Config`: rejected before any work starts
/// - `TokenLimitExceeded`: permanent rejection for this request shape;
///   the caller must shrink the request rather than retry
/// - `Backend`: propagated verbatim from the underlying handler
/// - `StreamProtocol`: misuse of the chunk stream contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WeirError {
    /// Configuration related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The request's own token cost exceeds the tokens-per-minute ceiling
    #[error("token_limit_exceeded: request of {estimated_tokens} tokens exceeds the {limit} tokens-per-minute limit")]
    TokenLimitExceeded { estimated_tokens: u64, limit: u64 },

    /// Failure reported by a backend handler
    #[error("Backend error ({provider}): {message}")]
    Backend { provider: String, message: String },

    /// Chunk stream contract violation
    #[error("Stream protocol violation: {message}")]
    StreamProtocol { message: String },
}

impl WeirError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a backend error attributed to a provider
    pub fn backend(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a stream protocol violation error
    pub fn stream_protocol(message: impl Into<String>) -> Self {
        Self::StreamProtocol {
            message: message.into(),
        }
    }

    /// Whether the error is transient and worth retrying as-is
    ///
    /// `TokenLimitExceeded` is deliberately not retryable: no amount of
    /// waiting lets the same request fit in a full window.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_limit_is_not_retryable() {
        let err = WeirError::TokenLimitExceeded {
            estimated_tokens: 5000,
            limit: 4000,
        };
        assert!(!err.is_retryable());
        assert!(err.to_string().starts_with("token_limit_exceeded"));
    }

    #[test]
    fn backend_errors_carry_provider() {
        let err = WeirError::backend("openrouter", "502 Bad Gateway");
        assert_eq!(
            err.to_string(),
            "Backend error (openrouter): 502 Bad Gateway"
        );
        assert!(err.is_retryable());
    }
}
