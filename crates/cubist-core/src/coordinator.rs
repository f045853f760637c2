//! The run loop: rounds of model invocation and tool execution until a
//! terminal status.

use crate::cancel::CancelToken;
use crate::error::ProviderError;
use crate::monitor::{NoopMonitor, StepMonitor};
use crate::provider::{ModelProvider, TurnEvent, TurnRequest};
use crate::registry::ToolRegistry;
use crate::run::{Run, RunStatus, Step, StepBudget, UserQuery};
use crate::stream::{FragmentSink, StreamAggregator};
use crate::tool::{ToolCall, ToolResult};
use futures::future::join_all;

/// How one model turn ended while draining its event stream.
enum TurnOutcome {
    Finished(Vec<ToolCall>),
    Failed(ProviderError),
    Cancelled,
}

/// Drives one query through repeated rounds of model invocation and tool
/// execution until a stop condition.
///
/// One coordinator executes one run at a time; concurrent runs are hosted
/// by separate coordinators sharing the registry. Within a run the rounds
/// are strictly sequential — round N+1's model invocation never starts
/// before every tool call of round N is resolved — while the tool calls of
/// a single round are dispatched concurrently and joined as a barrier.
pub struct Coordinator<P, R> {
    provider: P,
    registry: R,
    budget: StepBudget,
    monitor: Box<dyn StepMonitor + Send>,
    cancel: CancelToken,
}

impl<P, R> Coordinator<P, R>
where
    P: ModelProvider,
    R: ToolRegistry,
{
    /// Create a coordinator with a no-op monitor.
    pub fn new(provider: P, registry: R, budget: StepBudget) -> Self {
        Self {
            provider,
            registry,
            budget,
            monitor: Box::new(NoopMonitor),
            cancel: CancelToken::new(),
        }
    }

    /// Replace the step monitor.
    pub fn with_monitor(mut self, monitor: Box<dyn StepMonitor + Send>) -> Self {
        self.monitor = monitor;
        self
    }

    /// A token that cancels this coordinator's run from elsewhere.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Execute one run for `query`, streaming fragments into `sink` as they
    /// arrive.
    ///
    /// Always returns a [`Run`]: terminal failures are encoded in the run's
    /// status so that already-streamed text and completed steps stay
    /// deliverable and summarizable.
    pub async fn run(&mut self, query: UserQuery, sink: &mut dyn FragmentSink) -> Run {
        let schemas = self.registry.schemas();
        let budget = self.budget.get();
        let mut steps: Vec<Step> = Vec::new();
        let mut text = String::new();
        let mut fatal: Option<ProviderError> = None;

        let status = 'run: loop {
            if self.cancel.is_cancelled() {
                break 'run RunStatus::Cancelled;
            }
            if steps.len() >= budget {
                tracing::warn!(budget, "step budget exhausted mid-conversation");
                break 'run RunStatus::BudgetExceeded;
            }

            let request = TurnRequest {
                query: query.as_str(),
                history: &steps,
                tools: &schemas,
            };
            let stream = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break 'run RunStatus::Cancelled,
                begun = self.provider.begin_turn(request) => match begun {
                    Ok(stream) => stream,
                    Err(error) => {
                        tracing::error!(%error, "model turn could not start");
                        fatal = Some(error);
                        break 'run RunStatus::FatalError;
                    }
                },
            };

            let mut aggregator = StreamAggregator::new(sink);
            let outcome = self.drain_turn(stream, &mut aggregator).await;
            let step_text = aggregator.into_text();
            text.push_str(&step_text);

            let calls = match outcome {
                TurnOutcome::Finished(calls) => calls,
                TurnOutcome::Failed(error) => {
                    tracing::error!(%error, "model turn failed mid-stream");
                    fatal = Some(error);
                    break 'run RunStatus::FatalError;
                }
                TurnOutcome::Cancelled => break 'run RunStatus::Cancelled,
            };

            if calls.is_empty() {
                let step = Step {
                    index: steps.len(),
                    text: step_text,
                    tool_calls: Vec::new(),
                    tool_results: Vec::new(),
                };
                self.monitor.on_step(&step);
                steps.push(step);
                break 'run RunStatus::Complete;
            }

            // Concurrent dispatch with a full join barrier: the next round
            // must not start with unresolved calls.
            let executions = join_all(calls.iter().map(|call| self.registry.execute(call)));
            let results: Vec<ToolResult> = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break 'run RunStatus::Cancelled,
                results = executions => results,
            };
            tracing::debug!(
                step = steps.len(),
                tool_calls = calls.len(),
                "resolved tool calls"
            );

            let step = Step {
                index: steps.len(),
                text: step_text,
                tool_calls: calls,
                tool_results: results,
            };
            self.monitor.on_step(&step);
            steps.push(step);
        };

        let error = fatal.map(|error| error.to_string());
        Run::finished(query, self.budget, steps, text, status, error)
    }

    /// Drain one turn's event stream, forwarding fragments and collecting
    /// tool-call requests.
    async fn drain_turn(
        &self,
        mut stream: crate::provider::TurnStream,
        aggregator: &mut StreamAggregator<'_>,
    ) -> TurnOutcome {
        let mut calls: Vec<ToolCall> = Vec::new();
        loop {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return TurnOutcome::Cancelled,
                event = stream.next() => match event {
                    Some(TurnEvent::Fragment(fragment)) => aggregator.push(&fragment),
                    Some(TurnEvent::ToolCall(call)) => calls.push(call),
                    Some(TurnEvent::Finished) => return TurnOutcome::Finished(calls),
                    Some(TurnEvent::Failed(error)) => return TurnOutcome::Failed(error),
                    None => return TurnOutcome::Failed(ProviderError::Interrupted),
                },
            }
        }
    }
}
