//! Mock tools with predictable responses for controlled agent scenarios.

use cubist_core::tool::{ExecutionResult, Tool};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A mock tool that returns predefined responses based on its input.
///
/// Responses are keyed by the exact JSON input; unmatched inputs fall back
/// to the default response. Call tracking is shared across clones so a test
/// can keep a handle for assertions while the registry owns another.
#[derive(Debug, Clone)]
pub struct MockTool {
    name: String,
    description: String,
    schema: Value,
    responses: HashMap<String, ExecutionResult>,
    default_response: Option<ExecutionResult>,
    call_count: Arc<Mutex<usize>>,
    call_history: Arc<Mutex<Vec<Value>>>,
}

impl MockTool {
    /// Create a new mock tool with the given name and a permissive schema.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: "mock tool".to_string(),
            schema: serde_json::json!({ "type": "object" }),
            responses: HashMap::new(),
            default_response: None,
            call_count: Arc::new(Mutex::new(0)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the description surfaced in the tool schema.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the input schema the registry validates against.
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.schema = schema;
        self
    }

    /// Add a success response for a specific input.
    pub fn with_response(mut self, input: Value, output: Value) -> Self {
        self.responses
            .insert(input.to_string(), ExecutionResult::success(output));
        self
    }

    /// Add an `execution_failed` response for a specific input.
    pub fn with_failure(mut self, input: Value, error: impl Into<String>) -> Self {
        self.responses
            .insert(input.to_string(), ExecutionResult::execution_failed(error));
        self
    }

    /// Set a success response for any unmatched input.
    pub fn with_default_response(mut self, output: Value) -> Self {
        self.default_response = Some(ExecutionResult::success(output));
        self
    }

    /// Set an `execution_failed` response for any unmatched input.
    pub fn with_default_failure(mut self, error: impl Into<String>) -> Self {
        self.default_response = Some(ExecutionResult::execution_failed(error));
        self
    }

    /// Number of times this tool has been called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().expect("call count lock")
    }

    /// Inputs this tool has been called with, in order.
    pub fn call_history(&self) -> Vec<Value> {
        self.call_history.lock().expect("call history lock").clone()
    }

    /// Check whether the tool was called with a specific input.
    pub fn was_called_with(&self, input: &Value) -> bool {
        self.call_history
            .lock()
            .expect("call history lock")
            .contains(input)
    }
}

#[async_trait::async_trait]
impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> Value {
        self.schema.clone()
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        *self.call_count.lock().expect("call count lock") += 1;
        self.call_history
            .lock()
            .expect("call history lock")
            .push(input.clone());

        if let Some(response) = self.responses.get(&input.to_string()) {
            response.clone()
        } else if let Some(default) = &self.default_response {
            default.clone()
        } else {
            ExecutionResult::success(serde_json::json!({
                "mock": self.name,
                "input": input
            }))
        }
    }
}
