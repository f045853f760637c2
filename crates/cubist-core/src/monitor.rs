//! Step observation.

use crate::run::Step;

/// Read-only observer invoked once per completed step, after tool
/// resolution and before the step is appended to the run history.
///
/// Implementations must be side-effect-only (diagnostics, counters) and
/// must not block materially; they receive a shared view and cannot mutate
/// the step.
pub trait StepMonitor {
    /// Observe one completed step.
    fn on_step(&mut self, step: &Step);
}

/// Monitor that observes nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopMonitor;

impl StepMonitor for NoopMonitor {
    fn on_step(&mut self, _step: &Step) {}
}

/// Monitor that emits one structured tracing event per step.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingMonitor;

impl StepMonitor for TracingMonitor {
    fn on_step(&mut self, step: &Step) {
        let failed = step
            .tool_results
            .iter()
            .filter(|result| !result.is_success())
            .count();
        tracing::info!(
            step = step.index,
            text_len = step.text.len(),
            tool_calls = step.tool_calls.len(),
            failed_tool_calls = failed,
            "step finished"
        );
    }
}
