//! Tool capability surface: named, schema-described, read-only operations
//! the model may request, plus the call/result records that flow through a
//! run.

use serde_json::Value;

/// Maximum length of a registered tool name in bytes.
const MAX_TOOL_NAME_LEN: usize = 64;

/// Validated tool name used as a registry key.
///
/// Names are restricted to `[A-Za-z0-9_-]` and at most 64 bytes, so they are
/// always safe to embed in schemas, log lines, and wire payloads. Note that
/// [`ToolCall::name`] stays a plain `String`: call names come from the model
/// and are untrusted until the registry resolves them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ToolName(String);

impl ToolName {
    /// Parse and validate a tool name.
    ///
    /// # Returns
    ///
    /// `Ok(ToolName)` if the name is non-empty, within the length limit, and
    /// uses only the allowed character set; `Err(InvalidToolName)` otherwise.
    pub fn parse(name: &str) -> Result<Self, InvalidToolName> {
        if name.is_empty() {
            return Err(InvalidToolName::Empty);
        }
        if name.len() > MAX_TOOL_NAME_LEN {
            return Err(InvalidToolName::TooLong {
                len: name.len(),
                max: MAX_TOOL_NAME_LEN,
            });
        }
        if let Some(ch) = name
            .chars()
            .find(|c| !c.is_ascii_alphanumeric() && *c != '_' && *c != '-')
        {
            return Err(InvalidToolName::InvalidCharacter { ch });
        }
        Ok(Self(name.to_string()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ToolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Errors produced by [`ToolName::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidToolName {
    #[error("tool name must not be empty")]
    Empty,
    #[error("tool name is {len} bytes, maximum is {max}")]
    TooLong { len: usize, max: usize },
    #[error("tool name contains invalid character {ch:?}")]
    InvalidCharacter { ch: char },
}

/// A request from the model to invoke a specific tool with JSON input.
///
/// The id is synthesized by the provider and is unique within a run; every
/// [`ToolResult`] references the id of the call it resolves.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolCall {
    /// Call id, unique within the run.
    pub id: String,
    /// Requested tool name as emitted by the model (untrusted).
    pub name: String,
    /// JSON arguments for the tool.
    pub input: Value,
}

impl ToolCall {
    /// Create a new tool call.
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// Categorized failure reasons for tool execution.
///
/// Failures are data: they are folded into the next model turn rather than
/// aborting the run. The serialized `type` tag is the stable failure code.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// Input was rejected before the tool function was invoked: schema
    /// validation failed, the arguments did not parse, or the tool is not
    /// registered.
    InvalidInput { message: String },
    /// The tool's external call failed (transport error, non-success status,
    /// undecodable payload).
    ExecutionFailed { message: String },
}

impl FailureReason {
    /// Stable failure code matching the serialized `type` tag.
    pub fn code(&self) -> &'static str {
        match self {
            FailureReason::InvalidInput { .. } => "invalid_input",
            FailureReason::ExecutionFailed { .. } => "execution_failed",
        }
    }

    /// Human-readable failure message.
    pub fn message(&self) -> &str {
        match self {
            FailureReason::InvalidInput { message } => message,
            FailureReason::ExecutionFailed { message } => message,
        }
    }
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

/// The result of executing a tool: output on success, a structured reason on
/// failure. Inconsistent success/failure states are unrepresentable.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    /// Tool executed successfully with the given JSON output.
    Success { output: Value },
    /// Tool execution failed with a structured reason.
    Failure { reason: FailureReason },
}

impl ExecutionResult {
    /// Create a successful execution result.
    pub fn success(output: Value) -> Self {
        ExecutionResult::Success { output }
    }

    /// Create a failure rejected before the tool function ran.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        ExecutionResult::Failure {
            reason: FailureReason::InvalidInput {
                message: message.into(),
            },
        }
    }

    /// Create a failure from the tool's external call.
    pub fn execution_failed(message: impl Into<String>) -> Self {
        ExecutionResult::Failure {
            reason: FailureReason::ExecutionFailed {
                message: message.into(),
            },
        }
    }

    /// Check if the execution was successful.
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    /// Check if the execution failed.
    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionResult::Failure { .. })
    }

    /// Get the success output if available.
    pub fn output(&self) -> Option<&Value> {
        match self {
            ExecutionResult::Success { output } => Some(output),
            ExecutionResult::Failure { .. } => None,
        }
    }

    /// Get the failure reason if available.
    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            ExecutionResult::Success { .. } => None,
            ExecutionResult::Failure { reason } => Some(reason),
        }
    }

    /// Get the stable failure code (`invalid_input` / `execution_failed`) if
    /// this is a failure.
    pub fn error_code(&self) -> Option<&'static str> {
        self.failure_reason().map(FailureReason::code)
    }
}

/// Resolution of one [`ToolCall`]: exactly one result per call, failures
/// represented, never dropped.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolResult {
    /// Id of the call this result resolves.
    pub call_id: String,
    /// Tool name the call addressed.
    pub tool: String,
    /// Outcome of the execution.
    pub outcome: ExecutionResult,
}

impl ToolResult {
    /// Create a successful result for a call.
    pub fn success(call: &ToolCall, output: Value) -> Self {
        Self {
            call_id: call.id.clone(),
            tool: call.name.clone(),
            outcome: ExecutionResult::success(output),
        }
    }

    /// Create an `invalid_input` failure for a call.
    pub fn invalid_input(call: &ToolCall, message: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            tool: call.name.clone(),
            outcome: ExecutionResult::invalid_input(message),
        }
    }

    /// Create an `execution_failed` failure for a call.
    pub fn execution_failed(call: &ToolCall, message: impl Into<String>) -> Self {
        Self {
            call_id: call.id.clone(),
            tool: call.name.clone(),
            outcome: ExecutionResult::execution_failed(message),
        }
    }

    /// Check if the underlying execution succeeded.
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    /// Stable failure code if the execution failed.
    pub fn error_code(&self) -> Option<&'static str> {
        self.outcome.error_code()
    }
}

/// Trait defining an external read-only capability the model can invoke.
///
/// Each tool has a unique name, a JSON Schema describing its input, and an
/// async keyed lookup against some external data source. Tools are immutable
/// after registration and hold no per-call state.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use cubist_core::tool::{ExecutionResult, Tool};
/// use serde_json::{Value, json};
///
/// struct DoubleTool;
///
/// #[async_trait]
/// impl Tool for DoubleTool {
///     fn name(&self) -> &str {
///         "double"
///     }
///
///     fn input_schema(&self) -> Value {
///         json!({
///             "type": "object",
///             "properties": { "n": { "type": "number" } },
///             "required": ["n"]
///         })
///     }
///
///     async fn call(&self, input: Value) -> ExecutionResult {
///         match input.get("n").and_then(Value::as_f64) {
///             Some(n) => ExecutionResult::success(json!(n * 2.0)),
///             None => ExecutionResult::invalid_input("n must be a number"),
///         }
///     }
/// }
/// ```
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique name identifier used for registry routing.
    fn name(&self) -> &str;

    /// Human-readable description surfaced to the model alongside the schema.
    fn description(&self) -> &str {
        ""
    }

    /// JSON Schema for the tool's input. The registry validates every call
    /// against this schema before the tool function runs.
    fn input_schema(&self) -> Value {
        serde_json::json!({ "type": "object" })
    }

    /// Execute the tool with schema-validated input.
    async fn call(&self, input: Value) -> ExecutionResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        async fn call(&self, input: Value) -> ExecutionResult {
            ExecutionResult::success(json!({ "echo": input }))
        }
    }

    #[tokio::test]
    async fn tool_can_echo_input() {
        let tool = EchoTool;
        let result = tool.call(json!({ "msg": "hi" })).await;
        assert!(result.is_success());
        assert_eq!(result.output(), Some(&json!({ "echo": { "msg": "hi" } })));
    }

    #[test]
    fn tool_name_validation() {
        assert!(ToolName::parse("get_person").is_ok());
        assert!(ToolName::parse("search-persons").is_ok());
        assert!(ToolName::parse("Tool123").is_ok());

        assert_eq!(ToolName::parse(""), Err(InvalidToolName::Empty));
        assert!(matches!(
            ToolName::parse("has space"),
            Err(InvalidToolName::InvalidCharacter { ch: ' ' })
        ));
        assert!(matches!(
            ToolName::parse("../etc/passwd"),
            Err(InvalidToolName::InvalidCharacter { .. })
        ));
        let long = "a".repeat(65);
        assert!(matches!(
            ToolName::parse(&long),
            Err(InvalidToolName::TooLong { len: 65, max: 64 })
        ));
    }

    #[test]
    fn failure_codes_are_stable() {
        let invalid = ExecutionResult::invalid_input("bad args");
        let failed = ExecutionResult::execution_failed("boom");

        assert_eq!(invalid.error_code(), Some("invalid_input"));
        assert_eq!(failed.error_code(), Some("execution_failed"));
        assert_eq!(ExecutionResult::success(json!(1)).error_code(), None);
    }

    #[test]
    fn failure_reason_serializes_with_code_tag() {
        let reason = FailureReason::ExecutionFailed {
            message: "WCA API error: 500".to_string(),
        };
        let json = serde_json::to_value(&reason).expect("serializable");
        assert_eq!(json["type"], "execution_failed");
        assert_eq!(json["message"], "WCA API error: 500");
    }

    #[test]
    fn tool_result_references_its_call() {
        let call = ToolCall::new("call_1", "get_person", json!({ "wca_id": "2010ABCD01" }));
        let result = ToolResult::success(&call, json!({ "name": "A" }));

        assert_eq!(result.call_id, "call_1");
        assert_eq!(result.tool, "get_person");
        assert!(result.is_success());
    }
}
