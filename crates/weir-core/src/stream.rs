//! Cancellable, pull-based chunk stream
//!
//! A [`ChunkStream`]/[`ChunkSender`] pair bridges one producer and one
//! consumer for a single completion exchange. The producer pushes chunks
//! and signals completion or failure exactly once; the consumer drains
//! chunks in push order and may cancel at any time. The contract supports
//! at most one suspended consumer, which the single stored [`Waker`]
//! slot and the `&mut` receiver enforce.

use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use futures::{Stream, StreamExt};
use parking_lot::Mutex;

use crate::chunk::StreamChunk;
use crate::error::{WeirError, WeirResult};

/// Terminal state of the stream
#[derive(Debug)]
enum Terminal {
    /// Producer may still push chunks
    Open,
    /// Producer signalled normal completion
    Ended,
    /// Producer signalled failure; the error is handed out once
    Failed(Option<WeirError>),
    /// Consumer terminated early; further pushes are dropped
    Cancelled,
}

#[derive(Debug)]
struct StreamState {
    buffer: VecDeque<StreamChunk>,
    terminal: Terminal,
    waker: Option<Waker>,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<StreamState>,
}

impl Shared {
    /// Take the stored waker under the lock; the caller wakes it after
    /// releasing the guard so the consumer never contends on the mutex.
    fn take_waker(state: &mut StreamState) -> Option<Waker> {
        state.waker.take()
    }
}

/// Producer half of a chunk stream
///
/// Not `Clone`: each stream has exactly one producer across its lifetime.
#[derive(Debug)]
pub struct ChunkSender {
    shared: Arc<Shared>,
    finished: bool,
}

/// Consumer half of a chunk stream
///
/// Implements [`futures::Stream`] with `Item = WeirResult<StreamChunk>`.
/// Chunks arrive in exactly the order they were pushed. After a failure
/// the consumer observes every chunk pushed before it, then the error
/// once, then end-of-stream. Dropping the consumer cancels the stream.
#[derive(Debug)]
pub struct ChunkStream {
    shared: Arc<Shared>,
}

impl ChunkStream {
    /// Create a connected producer/consumer pair
    pub fn channel() -> (ChunkSender, ChunkStream) {
        let shared = Arc::new(Shared {
            state: Mutex::new(StreamState {
                buffer: VecDeque::new(),
                terminal: Terminal::Open,
                waker: None,
            }),
        });
        (
            ChunkSender {
                shared: Arc::clone(&shared),
                finished: false,
            },
            ChunkStream { shared },
        )
    }

    /// Pull the next chunk, suspending while the stream is open and empty
    ///
    /// Returns `None` once the stream has ended, been cancelled, or
    /// already yielded its failure.
    pub async fn next_chunk(&mut self) -> Option<WeirResult<StreamChunk>> {
        self.next().await
    }

    /// Terminate the stream from the consumer side
    ///
    /// Buffered chunks are discarded and later producer pushes become
    /// silent no-ops; the producer is expected to notice via
    /// [`ChunkSender::is_closed`] eventually, but is not required to.
    pub fn cancel(&mut self) {
        let mut state = self.shared.state.lock();
        if matches!(state.terminal, Terminal::Open) {
            state.terminal = Terminal::Cancelled;
            state.buffer.clear();
        }
    }
}

impl Stream for ChunkStream {
    type Item = WeirResult<StreamChunk>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut guard = self.shared.state.lock();
        let state = &mut *guard;

        // Buffered chunks drain first so that chunks pushed before a
        // completion or failure are never lost.
        if let Some(chunk) = state.buffer.pop_front() {
            return Poll::Ready(Some(Ok(chunk)));
        }

        match &mut state.terminal {
            Terminal::Open => {
                state.waker = Some(cx.waker().clone());
                Poll::Pending
            }
            Terminal::Ended | Terminal::Cancelled => Poll::Ready(None),
            Terminal::Failed(err) => match err.take() {
                Some(err) => Poll::Ready(Some(Err(err))),
                None => Poll::Ready(None),
            },
        }
    }
}

impl Drop for ChunkStream {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl ChunkSender {
    /// Append a chunk to the stream
    ///
    /// Returns `true` if the chunk was accepted. Pushes after consumer
    /// cancellation are silently dropped, since the producer may not poll
    /// for cancellation between pushes. Pushes after `complete`/`fail`
    /// are a protocol violation and trip a `debug_assert!`.
    pub fn push(&self, chunk: StreamChunk) -> bool {
        let mut guard = self.shared.state.lock();
        match guard.terminal {
            Terminal::Open => {
                guard.buffer.push_back(chunk);
                let waker = Shared::take_waker(&mut guard);
                drop(guard);
                if let Some(waker) = waker {
                    waker.wake();
                }
                true
            }
            Terminal::Cancelled => false,
            Terminal::Ended | Terminal::Failed(_) => {
                debug_assert!(false, "chunk pushed after stream was completed or failed");
                false
            }
        }
    }

    /// Mark the stream finished; idempotent
    pub fn complete(&mut self) {
        self.finished = true;
        let mut guard = self.shared.state.lock();
        if matches!(guard.terminal, Terminal::Open) {
            guard.terminal = Terminal::Ended;
            let waker = Shared::take_waker(&mut guard);
            drop(guard);
            if let Some(waker) = waker {
                waker.wake();
            }
        }
    }

    /// Mark the stream failed; the consumer observes `err` after draining
    /// any chunks pushed before the failure
    pub fn fail(&mut self, err: WeirError) {
        self.finished = true;
        let mut guard = self.shared.state.lock();
        match guard.terminal {
            Terminal::Open => {
                guard.terminal = Terminal::Failed(Some(err));
                let waker = Shared::take_waker(&mut guard);
                drop(guard);
                if let Some(waker) = waker {
                    waker.wake();
                }
            }
            Terminal::Cancelled => {}
            Terminal::Ended | Terminal::Failed(_) => {
                debug_assert!(false, "fail called after stream was completed or failed");
            }
        }
    }

    /// Whether the stream no longer accepts chunks
    ///
    /// Producers with long-running sources should check this between
    /// pushes to stop work early after consumer cancellation.
    pub fn is_closed(&self) -> bool {
        !matches!(self.shared.state.lock().terminal, Terminal::Open)
    }
}

impl Drop for ChunkSender {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let mut guard = self.shared.state.lock();
        if matches!(guard.terminal, Terminal::Open) {
            guard.terminal = Terminal::Failed(Some(WeirError::stream_protocol(
                "producer dropped before completing the stream",
            )));
            let waker = Shared::take_waker(&mut guard);
            drop(guard);
            if let Some(waker) = waker {
                waker.wake();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::StreamChunk;
    use std::time::Duration;

    fn text(s: &str) -> StreamChunk {
        StreamChunk::text(s)
    }

    #[tokio::test]
    async fn chunks_arrive_in_push_order() {
        let (tx, mut rx) = ChunkStream::channel();
        tx.push(text("a"));
        tx.push(text("b"));
        tx.push(text("c"));
        let mut tx = tx;
        tx.complete();

        let mut seen = Vec::new();
        while let Some(chunk) = rx.next_chunk().await {
            seen.push(chunk.unwrap());
        }
        assert_eq!(seen, vec![text("a"), text("b"), text("c")]);
    }

    #[tokio::test]
    async fn order_preserved_across_suspended_and_buffered_pushes() {
        let (tx, mut rx) = ChunkStream::channel();

        let producer = tokio::spawn(async move {
            let mut tx = tx;
            tx.push(text("a"));
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.push(text("b"));
            tx.push(text("c"));
            tx.complete();
        });

        // First chunk drains from the buffer, second wakes a suspended
        // consumer, third drains from the buffer again.
        assert_eq!(rx.next_chunk().await.unwrap().unwrap(), text("a"));
        assert_eq!(rx.next_chunk().await.unwrap().unwrap(), text("b"));
        assert_eq!(rx.next_chunk().await.unwrap().unwrap(), text("c"));
        assert!(rx.next_chunk().await.is_none());
        producer.await.unwrap();
    }

    #[tokio::test]
    async fn complete_is_idempotent() {
        let (mut tx, mut rx) = ChunkStream::channel();
        tx.push(text("only"));
        tx.complete();
        tx.complete();

        assert_eq!(rx.next_chunk().await.unwrap().unwrap(), text("only"));
        // Exactly one end-of-sequence signal regardless of double complete.
        assert!(rx.next_chunk().await.is_none());
        assert!(rx.next_chunk().await.is_none());
    }

    #[tokio::test]
    async fn usage_chunk_drains_before_failure_surfaces() {
        let (mut tx, mut rx) = ChunkStream::channel();
        tx.push(StreamChunk::usage(100, 50));
        tx.fail(WeirError::backend("ollama", "connection reset"));

        assert_eq!(
            rx.next_chunk().await.unwrap().unwrap(),
            StreamChunk::usage(100, 50)
        );
        let err = rx.next_chunk().await.unwrap().unwrap_err();
        assert_eq!(err, WeirError::backend("ollama", "connection reset"));
        // The error is delivered once; afterwards the stream is over.
        assert!(rx.next_chunk().await.is_none());
    }

    #[tokio::test]
    async fn fail_wakes_suspended_consumer() {
        let (tx, mut rx) = ChunkStream::channel();
        tokio::spawn(async move {
            let mut tx = tx;
            tokio::time::sleep(Duration::from_millis(10)).await;
            tx.fail(WeirError::backend("gemini", "boom"));
        });

        let err = rx.next_chunk().await.unwrap().unwrap_err();
        assert_eq!(err, WeirError::backend("gemini", "boom"));
    }

    #[tokio::test]
    async fn pushes_after_cancel_are_silently_dropped() {
        let (mut tx, mut rx) = ChunkStream::channel();
        tx.push(text("pending"));
        rx.cancel();

        assert!(!tx.push(text("late")));
        assert!(tx.is_closed());
        // Cancellation discards buffered chunks as well.
        assert!(rx.next_chunk().await.is_none());
        // Completing after cancellation is a harmless no-op.
        tx.complete();
    }

    #[tokio::test]
    async fn dropping_consumer_cancels_stream() {
        let (tx, rx) = ChunkStream::channel();
        drop(rx);
        assert!(tx.is_closed());
        assert!(!tx.push(text("late")));
        // Producer-side fail after consumer drop must not assert.
        let mut tx = tx;
        tx.fail(WeirError::backend("openai", "ignored"));
    }

    #[tokio::test]
    async fn dropped_producer_surfaces_protocol_error() {
        let (tx, mut rx) = ChunkStream::channel();
        tx.push(text("partial"));
        drop(tx);

        assert_eq!(rx.next_chunk().await.unwrap().unwrap(), text("partial"));
        let err = rx.next_chunk().await.unwrap().unwrap_err();
        assert!(matches!(err, WeirError::StreamProtocol { .. }));
    }
}
