//! Human relay handler
//!
//! Routes a completion request to a person instead of an API: the
//! formatted conversation goes out on a relay channel for someone to
//! paste into a model elsewhere, and whatever they paste back is
//! streamed as the response.

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::chunk::StreamChunk;
use crate::error::{WeirError, WeirResult};
use crate::handler::BackendHandler;
use crate::messages::{Message, MessageRole};
use crate::model::{Model, default_model};
use crate::registry::ProviderId;
use crate::stream::ChunkStream;

/// One relayed request: the text to hand to a human, and the slot their
/// answer comes back through
#[derive(Debug)]
pub struct RelayRequest {
    /// Conversation formatted for copy-and-paste
    pub formatted: String,
    /// Sender for the pasted-back response
    pub respond: oneshot::Sender<String>,
}

/// Backend handler that relays requests through a human operator
pub struct HumanRelayHandler {
    outbound: mpsc::UnboundedSender<RelayRequest>,
}

impl HumanRelayHandler {
    /// Create a handler that emits relay requests on `outbound`
    pub fn new(outbound: mpsc::UnboundedSender<RelayRequest>) -> Self {
        Self { outbound }
    }

    /// Format the conversation for a human to copy
    fn format_conversation(system_prompt: &str, messages: &[Message]) -> String {
        let mut formatted = format!("System Prompt:\n{system_prompt}\n\nConversation:\n");
        for message in messages {
            let role = match message.role {
                MessageRole::User => "User",
                MessageRole::Assistant => "Assistant",
            };
            formatted.push_str(&format!("{role}: {}\n\n", message.text()));
        }
        formatted
    }
}

#[async_trait]
impl BackendHandler for HumanRelayHandler {
    async fn stream_completion(
        &self,
        system_prompt: &str,
        messages: &[Message],
    ) -> WeirResult<ChunkStream> {
        let formatted = Self::format_conversation(system_prompt, messages);
        let (respond, response) = oneshot::channel();

        self.outbound
            .send(RelayRequest { formatted, respond })
            .map_err(|_| WeirError::backend("human-relay", "relay channel closed"))?;
        debug!("relay request handed to operator channel");

        let (mut tx, rx) = ChunkStream::channel();
        tokio::spawn(async move {
            match response.await {
                Ok(text) => {
                    tx.push(StreamChunk::text(text));
                    tx.complete();
                }
                Err(_) => {
                    tx.fail(WeirError::backend(
                        "human-relay",
                        "operator dropped the response channel",
                    ));
                }
            }
        });

        Ok(rx)
    }

    fn current_model(&self) -> Model {
        default_model(ProviderId::HumanRelay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn response_round_trips_as_one_text_chunk() {
        let (outbound, mut relay_rx) = mpsc::unbounded_channel();
        let handler = HumanRelayHandler::new(outbound);

        let messages = vec![Message::user("ping"), Message::assistant("pong")];
        let mut stream = handler
            .stream_completion("be helpful", &messages)
            .await
            .unwrap();

        let request = relay_rx.recv().await.unwrap();
        assert!(request.formatted.starts_with("System Prompt:\nbe helpful"));
        assert!(request.formatted.contains("User: ping"));
        assert!(request.formatted.contains("Assistant: pong"));

        request.respond.send("relayed answer".to_string()).unwrap();

        assert_eq!(
            stream.next_chunk().await.unwrap().unwrap(),
            StreamChunk::text("relayed answer")
        );
        assert!(stream.next_chunk().await.is_none());
    }

    #[tokio::test]
    async fn dropped_operator_fails_the_stream() {
        let (outbound, mut relay_rx) = mpsc::unbounded_channel();
        let handler = HumanRelayHandler::new(outbound);

        let mut stream = handler.stream_completion("sys", &[]).await.unwrap();
        let request = relay_rx.recv().await.unwrap();
        drop(request.respond);

        let err = stream.next_chunk().await.unwrap().unwrap_err();
        assert!(matches!(err, WeirError::Backend { .. }));
    }

    #[tokio::test]
    async fn closed_relay_channel_is_a_backend_error() {
        let (outbound, relay_rx) = mpsc::unbounded_channel();
        drop(relay_rx);
        let handler = HumanRelayHandler::new(outbound);

        let err = handler.stream_completion("sys", &[]).await.unwrap_err();
        assert!(matches!(err, WeirError::Backend { .. }));
    }

    #[test]
    fn reports_the_human_relay_model() {
        let (outbound, _relay_rx) = mpsc::unbounded_channel();
        let handler = HumanRelayHandler::new(outbound);
        let model = handler.current_model();
        assert_eq!(model.id, "human-relay");
        assert_eq!(model.info.context_window, 0);
    }
}
