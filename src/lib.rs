//! # Cubist
//!
//! Cubist is a bounded, streaming, tool-calling agent for World Cube
//! Association competition data. A run drives a language model through
//! repeated rounds of text generation and read-only tool lookups, streams
//! fragments as they arrive, and ends with a deterministic summary.
//!
//! ## Core Components
//!
//! - **[`Tool`]**: a named, schema-validated, read-only external operation
//! - **[`ToolRegistry`]**: immutable dispatch table shared across runs
//! - **[`ModelProvider`]**: the model capability boundary, one turn at a time
//! - **[`Coordinator`]**: the run loop bounding rounds by a [`StepBudget`]
//! - **[`RunSummary`]**: deterministic aggregate of a finished [`Run`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cubist::{Coordinator, RunSummary, StepBudget, UserQuery};
//! use cubist_gemini::GeminiProvider;
//! use cubist_tools::{WcaClient, wca_registry};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = wca_registry(WcaClient::new()?)?;
//! let provider = GeminiProvider::new("api-key", cubist_gemini::DEFAULT_MODEL)?;
//! let mut coordinator = Coordinator::new(provider, registry, StepBudget::DEFAULT);
//!
//! let query = UserQuery::new("Who holds the 3x3 world record?")?;
//! let mut answer = String::new();
//! let run = coordinator.run(query, &mut answer).await;
//! let summary = RunSummary::from_run(&run);
//! # let _ = summary;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Module aliases for namespaced access
// ============================================================================

pub use cubist_core as core;
pub use cubist_gemini as gemini;
pub use cubist_tools as tools;

#[cfg(feature = "testing")]
pub use cubist_testing as testing;

// ============================================================================
// Core types - run model, orchestration, streaming
// ============================================================================

pub use cubist_core::{
    CancelToken, Coordinator, FragmentSink, InvalidQuery, InvalidStepBudget, ModelProvider,
    NoopMonitor, NullSink, ProviderError, Run, RunStatus, RunSummary, Step, StepBudget,
    StepMonitor, StreamAggregator, TracingMonitor, TurnEvent, TurnRequest, TurnSender, TurnStream,
    UserQuery,
};

// ============================================================================
// Tools - capability trait, results, registry
// ============================================================================

pub use cubist_core::{
    ExecutionResult, FailureReason, InvalidToolName, Tool, ToolCall, ToolName, ToolRegistry,
    ToolResult, ToolSchema,
};

pub use cubist_tools::{InMemoryToolRegistry, RegistryError, WcaClient, WcaError, wca_registry};

// ============================================================================
// Model provider
// ============================================================================

pub use cubist_gemini::GeminiProvider;
