//! Derived end-of-run summary.

use crate::run::{Run, RunStatus};
use std::collections::BTreeMap;

/// Deterministic aggregate computed from a finished [`Run`].
///
/// Pure function of the run record: recomputing from the same run always
/// yields an identical value, and the serialized form is byte-identical
/// (the usage map is ordered). Total over absent fields — a run with zero
/// tool calls summarizes to an empty usage map, not an error, so partial
/// runs (budget-exceeded, fatal, cancelled) summarize fine.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunSummary {
    /// Number of completed steps.
    pub steps: usize,
    /// Total tool calls across all steps.
    pub tool_calls: usize,
    /// Total tool results across all steps.
    pub tool_results: usize,
    /// Invocation count per tool name, built by scanning every step's
    /// calls.
    pub tool_usage: BTreeMap<String, usize>,
    /// Length of the accumulated text in bytes.
    pub final_text_len: usize,
    /// Terminal status of the run.
    pub status: RunStatus,
}

impl RunSummary {
    /// Compute the summary of a finished run.
    pub fn from_run(run: &Run) -> Self {
        let mut tool_usage: BTreeMap<String, usize> = BTreeMap::new();
        let mut tool_calls = 0;
        let mut tool_results = 0;

        for step in run.steps() {
            tool_calls += step.tool_calls.len();
            tool_results += step.tool_results.len();
            for call in &step.tool_calls {
                *tool_usage.entry(call.name.clone()).or_insert(0) += 1;
            }
        }

        Self {
            steps: run.steps().len(),
            tool_calls,
            tool_results,
            tool_usage,
            final_text_len: run.final_text().len(),
            status: run.status(),
        }
    }
}
