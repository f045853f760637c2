//! Registry boundary: a read-only table of named tools the coordinator
//! dispatches calls through.

use crate::tool::{ToolCall, ToolResult};
use serde_json::Value;
use std::sync::Arc;

/// Wire-facing description of one registered tool, handed to the model
/// provider so the model can decide what to call.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolSchema {
    /// Registered tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// JSON Schema for the tool's input.
    pub parameters: Value,
}

impl ToolSchema {
    /// Create a new tool schema.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Trait for dispatching model-requested tool calls.
///
/// Registries are immutable once built and hold no per-call state, so a
/// single registry can back any number of concurrent runs without locking.
///
/// The execute contract: every call gets exactly one [`ToolResult`]. Unknown
/// tools and schema-invalid input resolve to `invalid_input` without the
/// underlying function ever running; failures of the external call resolve
/// to `execution_failed`. Failures are data for the next model turn, never
/// control flow.
#[async_trait::async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Schemas of every registered tool, in a stable order.
    fn schemas(&self) -> Vec<ToolSchema>;

    /// Number of registered tools.
    fn len(&self) -> usize;

    /// Check if the registry has no tools.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve one tool call to its result.
    async fn execute(&self, call: &ToolCall) -> ToolResult;
}

#[async_trait::async_trait]
impl<T: ToolRegistry + ?Sized> ToolRegistry for Arc<T> {
    fn schemas(&self) -> Vec<ToolSchema> {
        (**self).schemas()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        (**self).execute(call).await
    }
}
