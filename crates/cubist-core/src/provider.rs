//! Model capability boundary.
//!
//! A provider turns `{query, step history, tool schemas}` into one model
//! turn: an ordered stream of text fragments followed by a (possibly empty)
//! set of tool-call requests. The stream is finite, non-restartable, and
//! consumer-paced: events travel over a bounded channel, so the producer
//! suspends between fragments until the consumer has accepted the previous
//! one.

use crate::error::ProviderError;
use crate::registry::ToolSchema;
use crate::run::Step;
use crate::tool::ToolCall;
use tokio::sync::mpsc;

/// Capacity of the turn event channel. Small on purpose: pacing comes from
/// the consumer, not from buffering.
const TURN_CHANNEL_CAPACITY: usize = 64;

/// Input of one model turn: the user query plus an immutable snapshot of
/// everything that happened in prior rounds.
#[derive(Debug, Clone, Copy)]
pub struct TurnRequest<'a> {
    /// The user's query.
    pub query: &'a str,
    /// Completed steps, oldest first. Never mutated by the provider.
    pub history: &'a [Step],
    /// Schemas of every tool the model may request.
    pub tools: &'a [ToolSchema],
}

/// One event of a model turn, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnEvent {
    /// One incrementally delivered unit of generated text.
    Fragment(String),
    /// A tool-call request. The provider synthesizes the call id.
    ToolCall(ToolCall),
    /// The turn ended normally; no further events follow.
    Finished,
    /// The turn ended with a provider-level failure; no further events
    /// follow.
    Failed(ProviderError),
}

/// The receiver dropped its end of the turn channel, typically because the
/// run was cancelled. Producers should stop streaming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("turn consumer is gone")]
pub struct TurnClosed;

/// Producer half of a turn: what a [`ModelProvider`] writes events into.
#[derive(Debug, Clone)]
pub struct TurnSender {
    tx: mpsc::Sender<TurnEvent>,
}

impl TurnSender {
    /// Send a text fragment. Suspends until the consumer is ready.
    pub async fn fragment(&self, text: impl Into<String>) -> Result<(), TurnClosed> {
        self.send(TurnEvent::Fragment(text.into())).await
    }

    /// Send a tool-call request.
    pub async fn tool_call(&self, call: ToolCall) -> Result<(), TurnClosed> {
        self.send(TurnEvent::ToolCall(call)).await
    }

    /// Mark the turn as finished.
    pub async fn finished(&self) -> Result<(), TurnClosed> {
        self.send(TurnEvent::Finished).await
    }

    /// Mark the turn as failed.
    pub async fn failed(&self, error: ProviderError) -> Result<(), TurnClosed> {
        self.send(TurnEvent::Failed(error)).await
    }

    async fn send(&self, event: TurnEvent) -> Result<(), TurnClosed> {
        self.tx.send(event).await.map_err(|_| TurnClosed)
    }
}

/// Consumer half of a turn: a finite, non-restartable sequence of events.
#[derive(Debug)]
pub struct TurnStream {
    rx: mpsc::Receiver<TurnEvent>,
}

impl TurnStream {
    /// Create a connected sender/stream pair.
    pub fn channel() -> (TurnSender, TurnStream) {
        let (tx, rx) = mpsc::channel(TURN_CHANNEL_CAPACITY);
        (TurnSender { tx }, TurnStream { rx })
    }

    /// Receive the next event. `None` means the producer went away without
    /// marking the turn finished or failed.
    pub async fn next(&mut self) -> Option<TurnEvent> {
        self.rx.recv().await
    }
}

/// The model inference capability, as a black box.
///
/// `begin_turn` suspends until the model begins producing output, then
/// yields a [`TurnStream`]. Providers must support being re-invoked with
/// prior tool results folded into the history for multi-round continuation.
/// Errors from this trait are unrecoverable at the orchestration layer.
#[async_trait::async_trait]
pub trait ModelProvider: Send + Sync {
    /// Start one model turn.
    async fn begin_turn(&self, request: TurnRequest<'_>) -> Result<TurnStream, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn turn_events_arrive_in_order() {
        let (tx, mut stream) = TurnStream::channel();

        tokio::spawn(async move {
            tx.fragment("a").await.expect("consumer alive");
            tx.fragment("b").await.expect("consumer alive");
            tx.tool_call(ToolCall::new("call_1", "get_person", json!({})))
                .await
                .expect("consumer alive");
            tx.finished().await.expect("consumer alive");
        });

        assert_eq!(
            stream.next().await,
            Some(TurnEvent::Fragment("a".to_string()))
        );
        assert_eq!(
            stream.next().await,
            Some(TurnEvent::Fragment("b".to_string()))
        );
        assert!(matches!(stream.next().await, Some(TurnEvent::ToolCall(_))));
        assert_eq!(stream.next().await, Some(TurnEvent::Finished));
        assert_eq!(stream.next().await, None);
    }

    #[tokio::test]
    async fn dropped_consumer_stops_producer() {
        let (tx, stream) = TurnStream::channel();
        drop(stream);
        assert_eq!(tx.fragment("late").await, Err(TurnClosed));
    }
}
