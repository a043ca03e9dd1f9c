//! Backend handler abstraction

use async_trait::async_trait;

use crate::error::WeirResult;
use crate::messages::Message;
use crate::model::Model;
use crate::stream::ChunkStream;

/// Polymorphic interface over one LLM backend integration
///
/// One implementation exists per provider; the registry selects among
/// them. Handlers hold no rate-limiting state of their own — all of that
/// lives in the dispatcher wrapping them.
#[async_trait]
pub trait BackendHandler: Send + Sync {
    /// Begin producing chunks for the given conversation
    ///
    /// Must not block waiting for the full response: implementations
    /// return the stream promptly and produce into it asynchronously,
    /// typically from a spawned task.
    async fn stream_completion(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> WeirResult<ChunkStream>;

    /// Describe the model this handler currently targets
    ///
    /// Synchronous and side-effect-free.
    fn current_model(&self) -> Model;
}
