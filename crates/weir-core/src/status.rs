//! Out-of-band rate-limit status notifications
//!
//! Status updates travel on a caller-supplied channel, decoupled from
//! the chunk stream, so a UI can surface "waiting" states without
//! touching stream semantics.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Kind of rate-limit status update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    /// The dispatcher is delaying until the window opens
    Waiting,
    /// The request can never fit in the token window
    TokenLimitExceeded,
}

/// One status notification from the dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    /// What happened
    pub kind: StatusKind,
    /// Human-readable description for display
    pub message: String,
}

impl RateLimitStatus {
    /// Notification sent once per wait cycle
    pub fn waiting() -> Self {
        Self {
            kind: StatusKind::Waiting,
            message: "Waiting for rate limit window to reset...".to_string(),
        }
    }

    /// Notification sent before a token-ceiling rejection
    pub fn token_limit_exceeded() -> Self {
        Self {
            kind: StatusKind::TokenLimitExceeded,
            message: "Request exceeds the configured tokens-per-minute limit".to_string(),
        }
    }
}

/// Caller-supplied sink for status notifications
///
/// Unbounded so that emitting a status never suspends dispatch; a closed
/// receiver simply discards updates.
pub type StatusSink = mpsc::UnboundedSender<RateLimitStatus>;
