//! Weir core library
//!
//! A rate-limited, multi-backend streaming dispatch layer for LLM
//! completion requests. Requests carry a uniform shape (system prompt
//! plus message history); a registry picks the backend handler, a dual
//! sliding-window limiter gates admission, and responses arrive as a
//! cancellable stream of typed chunks.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//! use weir_core::{
//!     BackendHandler, DispatchConfig, HandlerRegistry, HumanRelayHandler, ProviderId,
//!     build_handler,
//! };
//!
//! # async fn example() -> weir_core::WeirResult<()> {
//! let (relay_tx, _relay_rx) = mpsc::unbounded_channel();
//! let mut registry = HandlerRegistry::with_default(ProviderId::HumanRelay);
//! registry.register(ProviderId::HumanRelay, move |_config| {
//!     Ok(Arc::new(HumanRelayHandler::new(relay_tx.clone())) as Arc<dyn BackendHandler>)
//! });
//!
//! let config = DispatchConfig::new("human-relay").with_rate_limit(Some(30), Some(90_000));
//! let (status_tx, _status_rx) = mpsc::unbounded_channel();
//! let handler = build_handler(&registry, &config, Some(status_tx))?;
//!
//! let mut stream = handler.stream_completion("You are helpful.", &[]).await?;
//! while let Some(chunk) = stream.next_chunk().await {
//!     println!("{:?}", chunk?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod chunk;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod estimator;
pub mod handler;
pub mod limiter;
pub mod messages;
pub mod model;
pub mod providers;
pub mod registry;
pub mod status;
pub mod stream;

pub use chunk::StreamChunk;
pub use config::{DispatchConfig, RateLimitSettings};
pub use dispatch::{RateLimitedHandler, build_handler};
pub use error::{WeirError, WeirResult};
pub use estimator::{TokenEstimator, WordCountEstimator};
pub use handler::BackendHandler;
pub use limiter::{Admission, RateLimiter};
pub use messages::{ContentPart, Message, MessageContent, MessageRole};
pub use model::{Model, ModelInfo, default_model};
pub use providers::{HumanRelayHandler, RelayRequest};
pub use registry::{HandlerFactory, HandlerRegistry, ProviderId};
pub use status::{RateLimitStatus, StatusKind, StatusSink};
pub use stream::{ChunkSender, ChunkStream};
