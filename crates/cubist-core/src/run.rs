//! Run model: the validated inputs of a run and its append-only record of
//! completed steps.

use crate::error::{InvalidQuery, InvalidStepBudget};
use crate::tool::{ToolCall, ToolResult};
use std::num::NonZeroUsize;

/// Maximum length of a user query in bytes.
const MAX_QUERY_LEN: usize = 8 * 1024;

/// Validated, non-empty user query.
///
/// Empty or whitespace-only queries are rejected here, before a run exists,
/// so the coordinator never has to handle them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserQuery(String);

impl UserQuery {
    /// Validate a query string.
    ///
    /// # Returns
    ///
    /// `Ok(UserQuery)` if the trimmed query is non-empty and within the
    /// length limit, `Err(InvalidQuery)` otherwise. The original spacing is
    /// preserved.
    pub fn new(query: impl Into<String>) -> Result<Self, InvalidQuery> {
        let query = query.into();
        if query.trim().is_empty() {
            return Err(InvalidQuery::Empty);
        }
        if query.len() > MAX_QUERY_LEN {
            return Err(InvalidQuery::TooLong {
                len: query.len(),
                max: MAX_QUERY_LEN,
            });
        }
        Ok(Self(query))
    }

    /// Get the query as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<&str> for UserQuery {
    type Error = InvalidQuery;

    fn try_from(query: &str) -> Result<Self, Self::Error> {
        Self::new(query)
    }
}

/// Maximum number of rounds permitted before forced termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepBudget(NonZeroUsize);

impl StepBudget {
    /// Default budget used by the CLI.
    pub const DEFAULT: StepBudget = StepBudget(NonZeroUsize::new(5).unwrap());

    /// Validate a step budget.
    pub fn new(budget: usize) -> Result<Self, InvalidStepBudget> {
        NonZeroUsize::new(budget).map(Self).ok_or(InvalidStepBudget)
    }

    /// Get the budget as a plain count.
    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl Default for StepBudget {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for StepBudget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One completed round: model-generated text plus the resolution of every
/// tool call requested during that round.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Step {
    /// Zero-based ordinal of this step within its run.
    pub index: usize,
    /// Text the model generated during this round.
    pub text: String,
    /// Tool calls requested by the model, in emission order.
    pub tool_calls: Vec<ToolCall>,
    /// One result per call, in the same order. Failures are represented,
    /// never omitted.
    pub tool_results: Vec<ToolResult>,
}

/// Terminal status of a run. Every run reaches exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The model finished a round without requesting tools.
    Complete,
    /// The step budget was exhausted while the model still wanted tools.
    /// The accumulated text is returned but may reflect incomplete
    /// reasoning.
    BudgetExceeded,
    /// The model capability itself failed; unrecoverable at this layer.
    FatalError,
    /// Cancellation was requested at a suspension point.
    Cancelled,
}

impl RunStatus {
    /// Whether the run ended without a fatal provider failure.
    pub fn is_ok(self) -> bool {
        matches!(self, RunStatus::Complete | RunStatus::BudgetExceeded)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            RunStatus::Complete => "complete",
            RunStatus::BudgetExceeded => "budget_exceeded",
            RunStatus::FatalError => "fatal_error",
            RunStatus::Cancelled => "cancelled",
        };
        write!(f, "{status}")
    }
}

/// The finished record of one bounded multi-step interaction.
///
/// A run is created when the coordinator is invoked, grows strictly in step
/// order, is finalized exactly once, and is read-only afterwards. It is
/// discarded after the caller consumes the summary; nothing persists across
/// runs.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    query: UserQuery,
    budget: StepBudget,
    steps: Vec<Step>,
    text: String,
    status: RunStatus,
    error: Option<String>,
}

impl Run {
    pub(crate) fn finished(
        query: UserQuery,
        budget: StepBudget,
        steps: Vec<Step>,
        text: String,
        status: RunStatus,
        error: Option<String>,
    ) -> Self {
        debug_assert!(steps.len() <= budget.get());
        Self {
            query,
            budget,
            steps,
            text,
            status,
            error,
        }
    }

    /// The query this run answered.
    pub fn query(&self) -> &UserQuery {
        &self.query
    }

    /// The step budget the run was bounded by.
    pub fn budget(&self) -> StepBudget {
        self.budget
    }

    /// Completed steps, in order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// All text streamed during the run, in arrival order. Includes text
    /// from a turn interrupted by a fatal error or cancellation: streamed
    /// output is never retracted.
    pub fn final_text(&self) -> &str {
        &self.text
    }

    /// Terminal status.
    pub fn status(&self) -> RunStatus {
        self.status
    }

    /// Provider error message when the status is
    /// [`RunStatus::FatalError`].
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}
