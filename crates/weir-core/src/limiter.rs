//! Dual sliding-window rate limiter
//!
//! Tracks two independent 60-second windows, one over request counts and
//! one over token counts, and decides whether a unit of work may proceed
//! now, must wait, or can never fit. The limiter never sleeps itself: it
//! reports the computed delay and the caller suspends and retries, so
//! the windows are re-pruned on every attempt.

use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Sliding window length shared by both dimensions
const WINDOW: Duration = Duration::from_secs(60);

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The request was recorded and may proceed now
    Admitted,
    /// The request's own token cost exceeds the ceiling; waiting never
    /// helps, the caller must shrink the request
    TokenLimitExceeded,
    /// The caller should suspend for the given duration and retry the
    /// admission from scratch; admission after the delay is not implied
    Waiting(Duration),
}

/// A token expenditure recorded in the token window
#[derive(Debug, Clone, Copy)]
struct TokenEntry {
    at: Instant,
    tokens: u64,
}

#[derive(Debug, Default)]
struct Windows {
    /// Request timestamps, time-ordered by insertion
    requests: Vec<Instant>,
    /// Token expenditures, time-ordered by insertion
    tokens: Vec<TokenEntry>,
}

/// Dual sliding-window rate limiter
///
/// Both dimensions are checked independently and conservatively; the
/// worst case of either governs. A `None` ceiling means unlimited for
/// that dimension.
#[derive(Debug)]
pub struct RateLimiter {
    requests_per_minute: Option<u64>,
    tokens_per_minute: Option<u64>,
    windows: Mutex<Windows>,
}

impl RateLimiter {
    /// Create a new limiter; non-positive ceilings count as unlimited
    pub fn new(requests_per_minute: Option<u32>, tokens_per_minute: Option<u32>) -> Self {
        Self {
            requests_per_minute: requests_per_minute
                .filter(|&n| n > 0)
                .map(u64::from),
            tokens_per_minute: tokens_per_minute.filter(|&n| n > 0).map(u64::from),
            windows: Mutex::new(Windows::default()),
        }
    }

    /// Whether any ceiling is configured at all
    pub fn is_limited(&self) -> bool {
        self.requests_per_minute.is_some() || self.tokens_per_minute.is_some()
    }

    /// The effective tokens-per-minute ceiling, if one is configured
    pub fn tokens_per_minute(&self) -> Option<u64> {
        self.tokens_per_minute
    }

    /// Decide whether a unit of work costing `estimated_tokens` may
    /// proceed now
    ///
    /// Runs prune, both window checks, and the admission record as one
    /// atomic step with respect to other `admit` calls on this limiter.
    /// On [`Admission::Admitted`] the request has been recorded and the
    /// caller should execute the work; on [`Admission::Waiting`] nothing
    /// was recorded and the caller retries after the delay.
    pub fn admit(&self, estimated_tokens: u64) -> Admission {
        let now = Instant::now();
        let mut windows = self.windows.lock();

        windows.requests.retain(|&at| now - at < WINDOW);
        windows.tokens.retain(|entry| now - entry.at < WINDOW);

        // A request larger than the whole token window can never fit.
        if let Some(limit) = self.tokens_per_minute {
            if estimated_tokens > limit {
                debug!(
                    estimated_tokens,
                    limit, "request alone exceeds the token window"
                );
                return Admission::TokenLimitExceeded;
            }
        }

        if let Some(limit) = self.requests_per_minute {
            if windows.requests.len() as u64 >= limit {
                // The window is full until its oldest request ages out.
                let oldest = windows.requests[0];
                let wait = WINDOW.saturating_sub(now - oldest);
                if !wait.is_zero() {
                    debug!(wait_ms = wait.as_millis() as u64, "request window full");
                    return Admission::Waiting(wait);
                }
            }
        }

        if let Some(limit) = self.tokens_per_minute {
            let used: u64 = windows.tokens.iter().map(|entry| entry.tokens).sum();
            if used + estimated_tokens > limit {
                // First-fit-by-time: the earliest entry whose cumulative
                // sum frees enough capacity determines the wait.
                let must_age_out = estimated_tokens - (limit - used);
                let mut cumulative = 0u64;
                let mut earliest = now;
                for entry in &windows.tokens {
                    cumulative += entry.tokens;
                    if cumulative >= must_age_out {
                        earliest = entry.at;
                        break;
                    }
                }
                let wait = WINDOW.saturating_sub(now - earliest);
                if !wait.is_zero() {
                    debug!(
                        wait_ms = wait.as_millis() as u64,
                        used, estimated_tokens, "token window full"
                    );
                    return Admission::Waiting(wait);
                }
            }
        }

        windows.requests.push(now);
        if self.tokens_per_minute.is_some() {
            windows.tokens.push(TokenEntry {
                at: now,
                tokens: estimated_tokens,
            });
        }
        Admission::Admitted
    }
}
