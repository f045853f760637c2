//! End-to-end scenarios: scripted model turns driving real registry
//! dispatch, from user query to final summary.

use cubist::{
    Coordinator, InMemoryToolRegistry, ProviderError, RunStatus, RunSummary, Step, StepBudget,
    StepMonitor, UserQuery,
};
use cubist_testing::{MockTool, ScriptedProvider, ScriptedTurn};
use serde_json::json;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

fn budget(n: usize) -> StepBudget {
    StepBudget::new(n).expect("valid budget")
}

fn query(text: &str) -> UserQuery {
    UserQuery::new(text).expect("valid query")
}

/// Registry with the two person-lookup tools the multi-round scenario uses.
fn person_registry() -> (InMemoryToolRegistry, MockTool, MockTool) {
    let search = MockTool::new("search_persons").with_default_response(json!({
        "result": [{ "wca_id": "2010ABCD01", "name": "Satya Darshan" }]
    }));
    let person = MockTool::new("get_person").with_default_response(json!({
        "person": { "name": "Satya Darshan", "country": "India" }
    }));
    let registry = InMemoryToolRegistry::new()
        .with_tool(Arc::new(search.clone()))
        .with_tool(Arc::new(person.clone()));
    (registry, search, person)
}

#[tokio::test]
async fn multi_round_lookup_completes_with_expected_usage() {
    let (registry, search, person) = person_registry();
    let provider = ScriptedProvider::new([
        ScriptedTurn::new()
            .fragment("Searching for the competitor. ")
            .call("call_1", "search_persons", json!({ "query": "Satya Darshan" })),
        ScriptedTurn::new().call("call_2", "get_person", json!({ "wca_id": "2010ABCD01" })),
        ScriptedTurn::answer("Satya Darshan is a speedcuber from India."),
    ]);

    let mut coordinator = Coordinator::new(provider, registry, budget(5));
    let mut streamed = String::new();
    let run = coordinator
        .run(query("Who is Satya Darshan"), &mut streamed)
        .await;

    assert_eq!(run.status(), RunStatus::Complete);
    assert!(run.steps().len() <= 5);
    assert_eq!(run.steps().len(), 3);
    assert_eq!(search.call_count(), 1);
    assert_eq!(person.call_count(), 1);

    // Everything forwarded to the sink is exactly the accumulated text.
    assert_eq!(streamed, run.final_text());
    assert_eq!(
        run.final_text(),
        "Searching for the competitor. Satya Darshan is a speedcuber from India."
    );

    let summary = RunSummary::from_run(&run);
    assert_eq!(summary.steps, 3);
    assert_eq!(summary.tool_calls, 2);
    assert_eq!(summary.tool_results, 2);
    assert_eq!(summary.tool_usage.get("search_persons"), Some(&1));
    assert_eq!(summary.tool_usage.get("get_person"), Some(&1));
}

#[tokio::test]
async fn budget_exhaustion_stops_after_exactly_budget_rounds() {
    let (registry, _search, _person) = person_registry();
    // The model wants a tool on every round; with budget 1 only the first
    // round runs.
    let provider = ScriptedProvider::new([
        ScriptedTurn::new().call("call_1", "search_persons", json!({ "query": "anyone" })),
    ]);

    let mut coordinator = Coordinator::new(provider, registry, budget(1));
    let mut streamed = String::new();
    let run = coordinator.run(query("endless lookups"), &mut streamed).await;

    assert_eq!(run.status(), RunStatus::BudgetExceeded);
    assert_eq!(run.steps().len(), 1);

    let summary = RunSummary::from_run(&run);
    assert_eq!(summary.steps, 1);
    assert_eq!(summary.status, RunStatus::BudgetExceeded);
}

#[tokio::test]
async fn tool_failure_is_data_not_abort() {
    let failing = MockTool::new("get_records").with_default_failure("WCA API error: 500");
    let registry = InMemoryToolRegistry::new().with_tool(Arc::new(failing.clone()));
    let provider = ScriptedProvider::new([
        ScriptedTurn::new().call("call_1", "get_records", json!({ "event": "333" })),
        ScriptedTurn::answer("I could not fetch the records."),
    ]);

    let mut coordinator = Coordinator::new(provider, registry, budget(5));
    let mut streamed = String::new();
    let run = coordinator.run(query("333 records?"), &mut streamed).await;

    // The run proceeded to a second round instead of aborting.
    assert_eq!(run.status(), RunStatus::Complete);
    assert_eq!(run.steps().len(), 2);

    let result = &run.steps()[0].tool_results[0];
    assert_eq!(result.error_code(), Some("execution_failed"));
    assert_eq!(failing.call_count(), 1);
}

#[tokio::test]
async fn schema_invalid_input_never_reaches_the_tool() {
    let strict = MockTool::new("get_person")
        .with_schema(json!({
            "type": "object",
            "properties": { "wca_id": { "type": "string" } },
            "required": ["wca_id"]
        }))
        .with_default_response(json!({ "person": {} }));
    let registry = InMemoryToolRegistry::new().with_tool(Arc::new(strict.clone()));
    let provider = ScriptedProvider::new([
        ScriptedTurn::new().call("call_1", "get_person", json!({ "wrong_field": 42 })),
        ScriptedTurn::answer("The lookup arguments were invalid."),
    ]);

    let mut coordinator = Coordinator::new(provider, registry, budget(5));
    let mut streamed = String::new();
    let run = coordinator.run(query("who?"), &mut streamed).await;

    assert_eq!(run.status(), RunStatus::Complete);
    let result = &run.steps()[0].tool_results[0];
    assert_eq!(result.error_code(), Some("invalid_input"));
    assert_eq!(strict.call_count(), 0);
}

#[tokio::test]
async fn call_ids_are_unique_and_results_match_their_step() {
    let (registry, _search, _person) = person_registry();
    let provider = ScriptedProvider::new([
        ScriptedTurn::new()
            .call("call_1", "search_persons", json!({ "query": "a" }))
            .call("call_2", "search_persons", json!({ "query": "b" })),
        ScriptedTurn::new().call("call_3", "get_person", json!({ "wca_id": "2010ABCD01" })),
        ScriptedTurn::answer("done"),
    ]);

    let mut coordinator = Coordinator::new(provider, registry, budget(5));
    let mut streamed = String::new();
    let run = coordinator.run(query("uniqueness"), &mut streamed).await;

    let mut seen = HashSet::new();
    for step in run.steps() {
        assert_eq!(step.tool_calls.len(), step.tool_results.len());
        let step_ids: HashSet<&str> =
            step.tool_calls.iter().map(|call| call.id.as_str()).collect();
        for (call, result) in step.tool_calls.iter().zip(&step.tool_results) {
            assert_eq!(call.id, result.call_id);
            assert!(step_ids.contains(result.call_id.as_str()));
        }
        for call in &step.tool_calls {
            assert!(seen.insert(call.id.clone()), "duplicate id {}", call.id);
        }
    }
    assert_eq!(seen.len(), 3);
}

#[tokio::test]
async fn tool_usage_histogram_counts_duplicates() {
    let a = MockTool::new("tool_a").with_default_response(json!("a"));
    let b = MockTool::new("tool_b").with_default_response(json!("b"));
    let registry = InMemoryToolRegistry::new()
        .with_tool(Arc::new(a))
        .with_tool(Arc::new(b));
    let provider = ScriptedProvider::new([
        ScriptedTurn::new()
            .call("call_1", "tool_a", json!({}))
            .call("call_2", "tool_a", json!({})),
        ScriptedTurn::new().call("call_3", "tool_b", json!({})),
        ScriptedTurn::answer("counted"),
    ]);

    let mut coordinator = Coordinator::new(provider, registry, budget(5));
    let mut streamed = String::new();
    let run = coordinator.run(query("count usage"), &mut streamed).await;

    let summary = RunSummary::from_run(&run);
    assert_eq!(summary.tool_usage.get("tool_a"), Some(&2));
    assert_eq!(summary.tool_usage.get("tool_b"), Some(&1));
    assert_eq!(summary.tool_usage.len(), 2);
}

#[tokio::test]
async fn summary_recomputation_is_byte_identical() {
    let (registry, _search, _person) = person_registry();
    let provider = ScriptedProvider::new([
        ScriptedTurn::new()
            .fragment("checking ")
            .call("call_1", "search_persons", json!({ "query": "x" })),
        ScriptedTurn::answer("found"),
    ]);

    let mut coordinator = Coordinator::new(provider, registry, budget(5));
    let mut streamed = String::new();
    let run = coordinator.run(query("determinism"), &mut streamed).await;

    let first = RunSummary::from_run(&run);
    let second = RunSummary::from_run(&run);
    assert_eq!(first, second);

    let first_bytes = serde_json::to_vec(&first).expect("serializable");
    let second_bytes = serde_json::to_vec(&second).expect("serializable");
    assert_eq!(first_bytes, second_bytes);
}

#[tokio::test]
async fn fatal_mid_stream_error_preserves_streamed_text() {
    let (registry, _search, _person) = person_registry();
    let provider = ScriptedProvider::new([ScriptedTurn::new()
        .fragment("partial answer ")
        .then_fail(ProviderError::Stream("connection reset".to_string()))]);

    let mut coordinator = Coordinator::new(provider, registry, budget(5));
    let mut streamed = String::new();
    let run = coordinator.run(query("flaky provider"), &mut streamed).await;

    assert_eq!(run.status(), RunStatus::FatalError);
    assert_eq!(streamed, "partial answer ");
    assert_eq!(run.final_text(), "partial answer ");
    assert!(run.error().expect("fatal error recorded").contains("connection reset"));

    // Partial-run summaries must not fail.
    let summary = RunSummary::from_run(&run);
    assert_eq!(summary.steps, 0);
    assert!(summary.tool_usage.is_empty());
    assert_eq!(summary.final_text_len, "partial answer ".len());
}

#[tokio::test]
async fn provider_failure_to_start_is_fatal() {
    let (registry, _search, _person) = person_registry();
    let provider = ScriptedProvider::failing(ProviderError::Request("dns failure".to_string()));

    let mut coordinator = Coordinator::new(provider, registry, budget(5));
    let mut streamed = String::new();
    let run = coordinator.run(query("unreachable"), &mut streamed).await;

    assert_eq!(run.status(), RunStatus::FatalError);
    assert!(run.steps().is_empty());
    assert!(run.error().expect("error recorded").contains("dns failure"));
}

/// Monitor that fires a cancellation after the first observed step.
struct CancelAfterFirstStep {
    cancel: cubist::CancelToken,
    observed: Arc<Mutex<Vec<usize>>>,
}

impl StepMonitor for CancelAfterFirstStep {
    fn on_step(&mut self, step: &Step) {
        self.observed.lock().expect("observed lock").push(step.index);
        self.cancel.cancel();
    }
}

#[tokio::test]
async fn cancellation_leaves_completed_steps_valid() {
    let (registry, _search, _person) = person_registry();
    let provider = ScriptedProvider::new([
        ScriptedTurn::new().call("call_1", "search_persons", json!({ "query": "x" })),
        ScriptedTurn::answer("never reached"),
    ]);

    let coordinator = Coordinator::new(provider, registry, budget(5));
    let observed = Arc::new(Mutex::new(Vec::new()));
    let monitor = CancelAfterFirstStep {
        cancel: coordinator.cancel_token(),
        observed: Arc::clone(&observed),
    };
    let mut coordinator = coordinator.with_monitor(Box::new(monitor));

    let mut streamed = String::new();
    let run = coordinator.run(query("cancel me"), &mut streamed).await;

    assert_eq!(run.status(), RunStatus::Cancelled);
    assert_eq!(run.steps().len(), 1);
    assert_eq!(*observed.lock().expect("observed lock"), vec![0]);

    let summary = RunSummary::from_run(&run);
    assert_eq!(summary.steps, 1);
    assert_eq!(summary.status, RunStatus::Cancelled);
}

#[tokio::test]
async fn pre_cancelled_run_does_nothing() {
    let (registry, search, _person) = person_registry();
    let provider = ScriptedProvider::new([
        ScriptedTurn::new().call("call_1", "search_persons", json!({ "query": "x" })),
    ]);

    let mut coordinator = Coordinator::new(provider, registry, budget(5));
    coordinator.cancel_token().cancel();

    let mut streamed = String::new();
    let run = coordinator.run(query("cancelled before start"), &mut streamed).await;

    assert_eq!(run.status(), RunStatus::Cancelled);
    assert!(run.steps().is_empty());
    assert!(streamed.is_empty());
    assert_eq!(search.call_count(), 0);
}

#[test]
fn empty_query_is_rejected_before_any_step() {
    assert!(UserQuery::new("").is_err());
    assert!(UserQuery::new(" \n ").is_err());
}

/// Monitor recording every observed step index.
struct RecordingMonitor(Arc<Mutex<Vec<usize>>>);

impl StepMonitor for RecordingMonitor {
    fn on_step(&mut self, step: &Step) {
        self.0.lock().expect("record lock").push(step.index);
    }
}

#[tokio::test]
async fn monitor_observes_each_step_exactly_once() {
    let (registry, _search, _person) = person_registry();
    let provider = ScriptedProvider::new([
        ScriptedTurn::new().call("call_1", "search_persons", json!({ "query": "x" })),
        ScriptedTurn::new().call("call_2", "get_person", json!({ "wca_id": "2010ABCD01" })),
        ScriptedTurn::answer("done"),
    ]);

    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut coordinator = Coordinator::new(provider, registry, budget(5))
        .with_monitor(Box::new(RecordingMonitor(Arc::clone(&observed))));

    let mut streamed = String::new();
    let run = coordinator.run(query("observe"), &mut streamed).await;

    assert_eq!(run.status(), RunStatus::Complete);
    assert_eq!(*observed.lock().expect("record lock"), vec![0, 1, 2]);
}
