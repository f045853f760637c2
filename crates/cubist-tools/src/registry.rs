//! In-memory tool registry with schema-validated dispatch.

use cubist_core::registry::{ToolRegistry, ToolSchema};
use cubist_core::tool::{InvalidToolName, Tool, ToolCall, ToolName, ToolResult};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Errors that can occur while building a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A tool with this name is already registered.
    #[error("tool '{name}' is already registered")]
    DuplicateTool { name: String },

    /// The tool's name failed validation.
    #[error(transparent)]
    InvalidName(#[from] InvalidToolName),

    /// The tool's input schema is not a valid JSON Schema.
    #[error("tool '{name}' has an invalid input schema: {message}")]
    InvalidSchema { name: String, message: String },
}

/// One registered tool with its schema compiled at registration time.
struct RegisteredTool {
    tool: Arc<dyn Tool>,
    description: String,
    schema: Value,
    validator: jsonschema::Validator,
}

/// Read-only table of named tools with O(log n) lookup and stable
/// (name-ordered) schema listing.
///
/// Built once at startup and then shared — the registry holds no per-call
/// mutable state, so it can serve any number of concurrent runs behind an
/// `Arc` without locking.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use cubist_core::{ExecutionResult, Tool};
/// use cubist_tools::InMemoryToolRegistry;
/// use serde_json::Value;
/// use std::sync::Arc;
///
/// struct EchoTool;
///
/// #[async_trait]
/// impl Tool for EchoTool {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn call(&self, input: Value) -> ExecutionResult {
///         ExecutionResult::success(input)
///     }
/// }
///
/// let registry = InMemoryToolRegistry::new().with_tool(Arc::new(EchoTool));
/// ```
#[derive(Default)]
pub struct InMemoryToolRegistry {
    tools: BTreeMap<ToolName, RegisteredTool>,
}

impl InMemoryToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Register a tool, rejecting duplicate names and invalid schemas.
    ///
    /// The tool's input schema is compiled here, once, so dispatch never
    /// re-parses it.
    pub fn try_with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, RegistryError> {
        let name = ToolName::parse(tool.name())?;
        if self.tools.contains_key(&name) {
            return Err(RegistryError::DuplicateTool {
                name: name.to_string(),
            });
        }

        let schema = tool.input_schema();
        let validator =
            jsonschema::validator_for(&schema).map_err(|e| RegistryError::InvalidSchema {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        self.tools.insert(
            name,
            RegisteredTool {
                description: tool.description().to_string(),
                tool,
                schema,
                validator,
            },
        );
        Ok(self)
    }

    /// Register a tool using the builder pattern.
    ///
    /// # Panics
    ///
    /// Panics if the name is invalid or already registered. Use
    /// [`InMemoryToolRegistry::try_with_tool`] for error handling.
    pub fn with_tool(self, tool: Arc<dyn Tool>) -> Self {
        self.try_with_tool(tool).expect("valid, unique tool name")
    }

    /// Names of all registered tools, in order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().map(|name| name.to_string()).collect()
    }
}

#[async_trait::async_trait]
impl ToolRegistry for InMemoryToolRegistry {
    fn schemas(&self) -> Vec<ToolSchema> {
        self.tools
            .iter()
            .map(|(name, registered)| {
                ToolSchema::new(
                    name.as_str(),
                    registered.description.clone(),
                    registered.schema.clone(),
                )
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.tools.len()
    }

    async fn execute(&self, call: &ToolCall) -> ToolResult {
        let name = match ToolName::parse(&call.name) {
            Ok(name) => name,
            Err(error) => {
                return ToolResult::invalid_input(call, format!("invalid tool name: {error}"));
            }
        };
        let Some(registered) = self.tools.get(&name) else {
            return ToolResult::invalid_input(call, format!("unknown tool '{name}'"));
        };

        // Validation failure must not reach the tool function.
        if let Err(error) = registered.validator.validate(&call.input) {
            tracing::debug!(tool = %name, %error, "rejected tool input");
            return ToolResult::invalid_input(call, error.to_string());
        }

        let outcome = registered.tool.call(call.input.clone()).await;
        ToolResult {
            call_id: call.id.clone(),
            tool: call.name.clone(),
            outcome,
        }
    }
}
