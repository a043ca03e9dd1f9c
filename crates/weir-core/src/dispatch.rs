//! Rate-limiting dispatcher
//!
//! Wraps a backend handler so that every completion request passes the
//! dual rate limiter before the handler runs. Waits suspend the calling
//! task natively; no chunk stream exists until a request is admitted.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, instrument, warn};

use crate::config::DispatchConfig;
use crate::error::{WeirError, WeirResult};
use crate::estimator::{TokenEstimator, WordCountEstimator};
use crate::handler::BackendHandler;
use crate::limiter::{Admission, RateLimiter};
use crate::messages::Message;
use crate::model::Model;
use crate::registry::HandlerRegistry;
use crate::status::{RateLimitStatus, StatusSink};
use crate::stream::ChunkStream;

/// Backend handler wrapper that enforces rate limits on dispatch
///
/// Implements [`BackendHandler`] itself, so rate-limited and bare
/// handlers are interchangeable to callers. All limiter state lives
/// here; the wrapped handler stays stateless with respect to limiting.
pub struct RateLimitedHandler {
    inner: Arc<dyn BackendHandler>,
    limiter: RateLimiter,
    estimator: Arc<dyn TokenEstimator>,
    status: Option<StatusSink>,
}

impl RateLimitedHandler {
    /// Wrap a handler with the given limiter, using the default
    /// word-count token estimator
    pub fn new(inner: Arc<dyn BackendHandler>, limiter: RateLimiter) -> Self {
        Self {
            inner,
            limiter,
            estimator: Arc::new(WordCountEstimator),
            status: None,
        }
    }

    /// Replace the token estimation strategy
    pub fn with_estimator(mut self, estimator: Arc<dyn TokenEstimator>) -> Self {
        self.estimator = estimator;
        self
    }

    /// Attach an out-of-band status sink
    pub fn with_status_sink(mut self, sink: StatusSink) -> Self {
        self.status = Some(sink);
        self
    }

    fn notify(&self, status: RateLimitStatus) {
        if let Some(sink) = &self.status {
            // A closed receiver just means nobody is listening.
            let _ = sink.send(status);
        }
    }
}

#[async_trait]
impl BackendHandler for RateLimitedHandler {
    #[instrument(skip_all, fields(model = %self.inner.current_model().id))]
    async fn stream_completion(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> WeirResult<ChunkStream> {
        let estimated_tokens = self.estimator.estimate(system_prompt, messages);

        loop {
            match self.limiter.admit(estimated_tokens) {
                Admission::Admitted => {
                    debug!(estimated_tokens, "request admitted");
                    return self.inner.stream_completion(system_prompt, messages).await;
                }
                Admission::Waiting(wait) => {
                    warn!(
                        wait_ms = wait.as_millis() as u64,
                        estimated_tokens, "rate limited, waiting for window to reset"
                    );
                    self.notify(RateLimitStatus::waiting());
                    tokio::time::sleep(wait).await;
                    // Re-admit from scratch; the delay does not imply
                    // admission, another caller may have taken the slot.
                }
                Admission::TokenLimitExceeded => {
                    warn!(estimated_tokens, "request exceeds the token window");
                    self.notify(RateLimitStatus::token_limit_exceeded());
                    return Err(WeirError::TokenLimitExceeded {
                        estimated_tokens,
                        limit: self.limiter.tokens_per_minute().unwrap_or_default(),
                    });
                }
            }
        }
    }

    fn current_model(&self) -> Model {
        self.inner.current_model()
    }
}

/// Build the handler for a configuration, wiring in rate limiting when
/// enabled
///
/// The composition point of the crate: registry resolution plus the
/// dispatcher decorator, so callers always receive a single
/// `Arc<dyn BackendHandler>` regardless of configuration.
pub fn build_handler(
    registry: &HandlerRegistry,
    config: &DispatchConfig,
    status: Option<StatusSink>,
) -> WeirResult<Arc<dyn BackendHandler>> {
    config.validate()?;
    let inner = registry.resolve(config)?;

    if !config.rate_limit.enabled {
        return Ok(inner);
    }

    let limiter = RateLimiter::new(
        config.rate_limit.requests_per_minute,
        config.rate_limit.tokens_per_minute,
    );
    debug!(
        provider = %config.provider,
        requests_per_minute = ?config.rate_limit.requests_per_minute,
        tokens_per_minute = ?config.rate_limit.tokens_per_minute,
        "rate limiting enabled for handler"
    );

    let mut handler = RateLimitedHandler::new(inner, limiter);
    if let Some(sink) = status {
        handler = handler.with_status_sink(sink);
    }
    Ok(Arc::new(handler))
}
