use clap::Parser;
use std::process::ExitCode;

mod output;

use cubist_core::{Coordinator, RunStatus, RunSummary, StepBudget, UserQuery};
use cubist_gemini::GeminiProvider;
use cubist_tools::{WcaClient, wca_registry};
use output::{ConsoleMonitor, StdoutSink};

const DEFAULT_QUERY: &str = "Who is Satya Darshan and what are his best results?";

#[derive(Parser, Debug)]
#[command(name = "cubist", version)]
#[command(about = "Ask questions about WCA competition data through a tool-calling agent")]
struct Cli {
    /// Free-form question to answer
    query: Option<String>,

    /// Maximum number of model rounds before forced termination
    #[arg(long, default_value_t = 5)]
    budget: usize,

    /// Gemini model to drive the run with
    #[arg(long, default_value = cubist_gemini::DEFAULT_MODEL)]
    model: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Logging goes to stderr so stdout stays a clean fragment stream.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env();
    let env_filter = match "info".parse() {
        Ok(directive) => env_filter.add_directive(directive),
        Err(_) => env_filter,
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();

    let query = match UserQuery::new(cli.query.unwrap_or_else(|| DEFAULT_QUERY.to_string())) {
        Ok(query) => query,
        Err(error) => {
            eprintln!("invalid query: {error}");
            return ExitCode::from(2);
        }
    };
    let budget = match StepBudget::new(cli.budget) {
        Ok(budget) => budget,
        Err(error) => {
            eprintln!("invalid budget: {error}");
            return ExitCode::from(2);
        }
    };
    let api_key = match std::env::var("GEMINI_API_KEY") {
        Ok(key) if !key.is_empty() => key,
        _ => {
            eprintln!("GEMINI_API_KEY is not set");
            return ExitCode::from(2);
        }
    };

    let client = match WcaClient::new() {
        Ok(client) => client,
        Err(error) => {
            tracing::error!(%error, "could not build WCA client");
            return ExitCode::from(1);
        }
    };
    let registry = match wca_registry(client) {
        Ok(registry) => registry,
        Err(error) => {
            tracing::error!(%error, "could not build tool registry");
            return ExitCode::from(1);
        }
    };
    let provider = match GeminiProvider::new(api_key, cli.model) {
        Ok(provider) => provider,
        Err(error) => {
            tracing::error!(%error, "could not build Gemini provider");
            return ExitCode::from(1);
        }
    };

    let mut coordinator = Coordinator::new(provider, registry, budget)
        .with_monitor(Box::new(ConsoleMonitor::default()));

    let cancel = coordinator.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("cancellation requested");
            cancel.cancel();
        }
    });

    output::print_header(query.as_str());
    let mut sink = StdoutSink::new();
    let run = coordinator.run(query, &mut sink).await;
    println!();

    let summary = RunSummary::from_run(&run);
    output::print_summary(&summary);

    match run.status() {
        RunStatus::Complete => ExitCode::SUCCESS,
        RunStatus::BudgetExceeded => {
            eprintln!("step budget exhausted; the answer above may be incomplete");
            ExitCode::SUCCESS
        }
        RunStatus::FatalError => {
            eprintln!(
                "run failed: {}",
                run.error().unwrap_or("unknown provider error")
            );
            ExitCode::from(1)
        }
        RunStatus::Cancelled => {
            eprintln!("run cancelled");
            ExitCode::from(130)
        }
    }
}
