//! # Cubist Tools
//!
//! Tool registry and the standard WCA lookup suite for Cubist agents.
//!
//! - **Registry** (`registry`): schema-validated, read-only dispatch table
//! - **WCA tools** (`wca`): lookups against the World Cube Association API

/// Tool registry implementation with schema validation.
pub mod registry;
/// WCA API client and lookup tools.
pub mod wca;

pub use registry::{InMemoryToolRegistry, RegistryError};
pub use wca::{WcaClient, WcaError, wca_registry};

pub use cubist_core::{ExecutionResult, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
