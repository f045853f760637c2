//! # Cubist Core
//!
//! Core traits and types for the Cubist agent: the tool capability surface,
//! the model-provider boundary, the bounded run loop, and the derived
//! end-of-run summary.

pub mod cancel;
pub mod coordinator;
pub mod error;
pub mod monitor;
pub mod provider;
pub mod registry;
pub mod run;
pub mod stream;
pub mod summary;
pub mod tool;

pub use cancel::CancelToken;
pub use coordinator::Coordinator;
pub use error::{InvalidQuery, InvalidStepBudget, ProviderError};
pub use monitor::{NoopMonitor, StepMonitor, TracingMonitor};
pub use provider::{ModelProvider, TurnClosed, TurnEvent, TurnRequest, TurnSender, TurnStream};
pub use registry::{ToolRegistry, ToolSchema};
pub use run::{Run, RunStatus, Step, StepBudget, UserQuery};
pub use stream::{FragmentSink, NullSink, StreamAggregator};
pub use summary::RunSummary;
pub use tool::{ExecutionResult, FailureReason, InvalidToolName, Tool, ToolCall, ToolName, ToolResult};
