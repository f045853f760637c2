//! Error types for query validation, budget validation, and the model
//! provider boundary.
//!
//! Tool-level failures never appear here: they are data, carried inside
//! [`crate::tool::ToolResult`] and fed back to the model. Only a
//! provider-level failure unwinds a run.

/// Errors produced by [`crate::run::UserQuery::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidQuery {
    #[error("query must not be empty")]
    Empty,
    #[error("query is {len} bytes, maximum is {max}")]
    TooLong { len: usize, max: usize },
}

/// Error produced by [`crate::run::StepBudget::new`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("step budget must be at least 1")]
pub struct InvalidStepBudget;

/// Unrecoverable failures of the model capability itself.
///
/// Any of these terminates the run with `FatalError` and is reported to the
/// caller without automatic retry. Text streamed before the failure stays
/// delivered.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// The request could not be sent or the connection failed.
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider answered with a non-success status.
    #[error("provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// The provider reported an error mid-stream, or the stream payload was
    /// malformed.
    #[error("provider stream failed: {0}")]
    Stream(String),

    /// The event stream ended before the turn was marked finished.
    #[error("provider stream ended before the turn finished")]
    Interrupted,
}
