//! Scripted model provider replaying prepared turns.

use cubist_core::ProviderError;
use cubist_core::provider::{ModelProvider, TurnRequest, TurnStream};
use cubist_core::tool::ToolCall;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One prepared model turn: fragments, then tool calls, then the terminal
/// marker (finished, or a scripted mid-stream failure).
#[derive(Debug, Clone, Default)]
pub struct ScriptedTurn {
    fragments: Vec<String>,
    calls: Vec<ToolCall>,
    failure: Option<ProviderError>,
}

impl ScriptedTurn {
    /// Start an empty turn.
    pub fn new() -> Self {
        Self::default()
    }

    /// A turn that streams one fragment and requests nothing — the shape of
    /// a final answer.
    pub fn answer(text: impl Into<String>) -> Self {
        Self::new().fragment(text)
    }

    /// Append a text fragment.
    pub fn fragment(mut self, text: impl Into<String>) -> Self {
        self.fragments.push(text.into());
        self
    }

    /// Append a tool-call request.
    pub fn call(mut self, id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        self.calls.push(ToolCall::new(id, name, input));
        self
    }

    /// End the turn with a provider failure instead of a clean finish.
    pub fn then_fail(mut self, error: ProviderError) -> Self {
        self.failure = Some(error);
        self
    }
}

/// Model provider that replays scripted turns in order.
///
/// Each `begin_turn` consumes the next scripted turn; running out of script
/// is a test authoring error and surfaces as a provider failure.
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<ScriptedTurn>>,
    start_error: Option<ProviderError>,
}

impl ScriptedProvider {
    /// Create a provider replaying `turns` in order.
    pub fn new(turns: impl IntoIterator<Item = ScriptedTurn>) -> Self {
        Self {
            turns: Mutex::new(turns.into_iter().collect()),
            start_error: None,
        }
    }

    /// Create a provider whose `begin_turn` fails immediately.
    pub fn failing(error: ProviderError) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            start_error: Some(error),
        }
    }

    /// Number of scripted turns not yet consumed.
    pub fn remaining_turns(&self) -> usize {
        self.turns.lock().expect("script lock").len()
    }
}

#[async_trait::async_trait]
impl ModelProvider for ScriptedProvider {
    async fn begin_turn(&self, _request: TurnRequest<'_>) -> Result<TurnStream, ProviderError> {
        if let Some(error) = &self.start_error {
            return Err(error.clone());
        }

        let turn = self
            .turns
            .lock()
            .expect("script lock")
            .pop_front()
            .ok_or_else(|| ProviderError::Stream("scripted turns exhausted".to_string()))?;

        let (tx, stream) = TurnStream::channel();
        tokio::spawn(async move {
            for fragment in turn.fragments {
                if tx.fragment(fragment).await.is_err() {
                    return;
                }
            }
            for call in turn.calls {
                if tx.tool_call(call).await.is_err() {
                    return;
                }
            }
            match turn.failure {
                Some(error) => {
                    let _ = tx.failed(error).await;
                }
                None => {
                    let _ = tx.finished().await;
                }
            }
        });
        Ok(stream)
    }
}
