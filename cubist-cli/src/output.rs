//! Console rendering: the stdout fragment sink, per-step diagnostics, and
//! the end-of-run summary block.

use cubist_core::tool::ExecutionResult;
use cubist_core::{FragmentSink, RunSummary, Step, StepMonitor};
use std::io::Write;

const RULE_WIDTH: usize = 80;
const RESULT_PREVIEW_LEN: usize = 500;
const TEXT_PREVIEW_LEN: usize = 200;

fn rule(ch: char) -> String {
    std::iter::repeat_n(ch, RULE_WIDTH).collect()
}

/// Truncate on a char boundary, appending an ellipsis when shortened.
fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Print the run banner.
pub fn print_header(query: &str) {
    println!("{}", rule('='));
    println!("USER QUERY: {query}");
    println!("{}", rule('='));
    println!();
}

/// Sink that writes fragments straight to stdout, flushing each one so the
/// stream is visible as it arrives.
pub struct StdoutSink {
    stdout: std::io::Stdout,
}

impl StdoutSink {
    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
        }
    }
}

impl FragmentSink for StdoutSink {
    fn accept(&mut self, fragment: &str) {
        let mut lock = self.stdout.lock();
        let _ = lock.write_all(fragment.as_bytes());
        let _ = lock.flush();
    }
}

/// Step monitor printing one diagnostic block per completed step.
#[derive(Debug, Default)]
pub struct ConsoleMonitor;

impl StepMonitor for ConsoleMonitor {
    fn on_step(&mut self, step: &Step) {
        println!();
        println!("[STEP {} FINISHED]", step.index + 1);
        println!("{}", rule('-'));

        if !step.tool_calls.is_empty() {
            println!("TOOL CALLS ({}):", step.tool_calls.len());
            for call in &step.tool_calls {
                println!("  {} [{}]", call.name, call.id);
                println!("    input: {}", call.input);
            }
        }

        if !step.tool_results.is_empty() {
            println!("TOOL RESULTS ({}):", step.tool_results.len());
            for result in &step.tool_results {
                match &result.outcome {
                    ExecutionResult::Success { output } => {
                        println!(
                            "  {} -> {}",
                            result.tool,
                            truncate_with_ellipsis(&output.to_string(), RESULT_PREVIEW_LEN)
                        );
                    }
                    ExecutionResult::Failure { reason } => {
                        println!("  {} -> {reason}", result.tool);
                    }
                }
            }
        }

        if !step.text.is_empty() {
            println!(
                "TEXT: {}",
                truncate_with_ellipsis(&step.text, TEXT_PREVIEW_LEN)
            );
        }
        println!("{}", rule('-'));
    }
}

/// Print the end-of-run summary block.
pub fn print_summary(summary: &RunSummary) {
    println!();
    println!("SUMMARY");
    println!("{}", rule('-'));
    println!("Status: {}", summary.status);
    println!("Total steps: {}", summary.steps);
    println!("Total tool calls: {}", summary.tool_calls);
    println!("Total tool results: {}", summary.tool_results);
    if !summary.tool_usage.is_empty() {
        println!("Tools used:");
        for (name, count) in &summary.tool_usage {
            println!("  - {name}: {count} time(s)");
        }
    }
    println!("Final response length: {} bytes", summary.final_text_len);
    println!("{}", rule('-'));
}
