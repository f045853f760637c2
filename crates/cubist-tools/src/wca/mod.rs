//! World Cube Association API tools.
//!
//! A thin async client for the public WCA REST API plus the lookup tools
//! the agent is allowed to call. Everything here is read-only; a run never
//! mutates anything on the WCA side.

mod client;
mod tools;

pub use client::{WCA_BASE_URL, WcaClient, WcaError};
pub use tools::{
    GetCompetitionResultsTool, GetCompetitionTool, GetCountriesTool, GetPersonResultsTool,
    GetPersonTool, GetRecordsTool, GetUpcomingCompetitionsTool, GetWorldRankingsTool,
    SearchPersonsTool, wca_registry,
};
