//! The WCA lookup tool suite.
//!
//! Nine read-only tools over the WCA API. Input schemas carry per-field
//! descriptions for the model and format patterns so that malformed
//! identifiers are rejected by the registry before any request is sent.

use super::client::WcaClient;
use crate::registry::{InMemoryToolRegistry, RegistryError};
use cubist_core::tool::{ExecutionResult, Tool};
use serde_json::{Value, json};
use std::sync::Arc;

/// Map a WCA lookup outcome into an execution result.
fn lookup_result(result: Result<Value, super::WcaError>) -> ExecutionResult {
    match result {
        Ok(output) => ExecutionResult::success(output),
        Err(error) => ExecutionResult::execution_failed(error.to_string()),
    }
}

fn wca_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "wca_id": {
                "type": "string",
                "description": "The WCA ID of the person (format: YYYYABCD##)",
                "pattern": "^[0-9]{4}[A-Z]{4}[0-9]{2}$"
            }
        },
        "required": ["wca_id"],
        "additionalProperties": false
    })
}

fn competition_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "competition_id": {
                "type": "string",
                "description": "The competition ID (e.g., 'RubiksCube2024')",
                "pattern": "^[A-Za-z0-9]+$"
            }
        },
        "required": ["competition_id"],
        "additionalProperties": false
    })
}

fn empty_schema() -> Value {
    json!({
        "type": "object",
        "properties": {},
        "additionalProperties": false
    })
}

#[derive(serde::Deserialize)]
struct WcaIdArgs {
    wca_id: String,
}

#[derive(serde::Deserialize)]
struct CompetitionIdArgs {
    competition_id: String,
}

#[derive(serde::Deserialize)]
struct SearchArgs {
    query: String,
}

#[derive(serde::Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum RankingType {
    Single,
    Average,
}

impl RankingType {
    fn as_str(self) -> &'static str {
        match self {
            RankingType::Single => "single",
            RankingType::Average => "average",
        }
    }
}

#[derive(serde::Deserialize)]
struct RankingArgs {
    event: String,
    #[serde(rename = "type")]
    ranking_type: RankingType,
    #[serde(default)]
    page: Option<u32>,
}

#[derive(serde::Deserialize)]
struct EventArgs {
    event: String,
}

/// Get information about a person by WCA ID.
pub struct GetPersonTool {
    client: WcaClient,
}

impl GetPersonTool {
    pub fn new(client: WcaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetPersonTool {
    fn name(&self) -> &str {
        "get_person"
    }

    fn description(&self) -> &str {
        "Get information about a person/competitor by their WCA ID (e.g., '2010ABCD01')"
    }

    fn input_schema(&self) -> Value {
        wca_id_schema()
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let args: WcaIdArgs = match serde_json::from_value(input) {
            Ok(args) => args,
            Err(error) => return ExecutionResult::invalid_input(error.to_string()),
        };
        lookup_result(
            self.client
                .get(&format!("/persons/{}", args.wca_id), &[])
                .await,
        )
    }
}

/// Get all competition results for a person by WCA ID.
pub struct GetPersonResultsTool {
    client: WcaClient,
}

impl GetPersonResultsTool {
    pub fn new(client: WcaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetPersonResultsTool {
    fn name(&self) -> &str {
        "get_person_results"
    }

    fn description(&self) -> &str {
        "Get all competition results for a person by their WCA ID"
    }

    fn input_schema(&self) -> Value {
        wca_id_schema()
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let args: WcaIdArgs = match serde_json::from_value(input) {
            Ok(args) => args,
            Err(error) => return ExecutionResult::invalid_input(error.to_string()),
        };
        lookup_result(
            self.client
                .get(&format!("/persons/{}/results", args.wca_id), &[])
                .await,
        )
    }
}

/// Search for persons by name.
pub struct SearchPersonsTool {
    client: WcaClient,
}

impl SearchPersonsTool {
    pub fn new(client: WcaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SearchPersonsTool {
    fn name(&self) -> &str {
        "search_persons"
    }

    fn description(&self) -> &str {
        "Search for persons/competitors by name. Returns multiple results so the closest match can be chosen."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The name to search for",
                    "minLength": 1
                }
            },
            "required": ["query"],
            "additionalProperties": false
        })
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let args: SearchArgs = match serde_json::from_value(input) {
            Ok(args) => args,
            Err(error) => return ExecutionResult::invalid_input(error.to_string()),
        };
        lookup_result(
            self.client
                .get(
                    "/search/users",
                    &[("q", args.query.as_str()), ("persons_table", "true")],
                )
                .await,
        )
    }
}

/// Get details about a competition.
pub struct GetCompetitionTool {
    client: WcaClient,
}

impl GetCompetitionTool {
    pub fn new(client: WcaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetCompetitionTool {
    fn name(&self) -> &str {
        "get_competition"
    }

    fn description(&self) -> &str {
        "Get details about a competition by its competition ID"
    }

    fn input_schema(&self) -> Value {
        competition_id_schema()
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let args: CompetitionIdArgs = match serde_json::from_value(input) {
            Ok(args) => args,
            Err(error) => return ExecutionResult::invalid_input(error.to_string()),
        };
        lookup_result(
            self.client
                .get(&format!("/competitions/{}", args.competition_id), &[])
                .await,
        )
    }
}

/// List upcoming competitions.
pub struct GetUpcomingCompetitionsTool {
    client: WcaClient,
}

impl GetUpcomingCompetitionsTool {
    pub fn new(client: WcaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetUpcomingCompetitionsTool {
    fn name(&self) -> &str {
        "get_upcoming_competitions"
    }

    fn description(&self) -> &str {
        "Get a list of upcoming competitions"
    }

    fn input_schema(&self) -> Value {
        empty_schema()
    }

    async fn call(&self, _input: Value) -> ExecutionResult {
        lookup_result(self.client.get("/competitions", &[("upcoming", "true")]).await)
    }
}

/// Get results for a competition.
pub struct GetCompetitionResultsTool {
    client: WcaClient,
}

impl GetCompetitionResultsTool {
    pub fn new(client: WcaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetCompetitionResultsTool {
    fn name(&self) -> &str {
        "get_competition_results"
    }

    fn description(&self) -> &str {
        "Get results for a specific competition"
    }

    fn input_schema(&self) -> Value {
        competition_id_schema()
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let args: CompetitionIdArgs = match serde_json::from_value(input) {
            Ok(args) => args,
            Err(error) => return ExecutionResult::invalid_input(error.to_string()),
        };
        lookup_result(
            self.client
                .get(
                    &format!("/competitions/{}/results", args.competition_id),
                    &[],
                )
                .await,
        )
    }
}

/// Get world rankings for an event.
pub struct GetWorldRankingsTool {
    client: WcaClient,
}

impl GetWorldRankingsTool {
    pub fn new(client: WcaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetWorldRankingsTool {
    fn name(&self) -> &str {
        "get_world_rankings"
    }

    fn description(&self) -> &str {
        "Get world rankings for an event (single or average)"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "event": {
                    "type": "string",
                    "description": "The event ID (e.g., '333', '222', '333oh', 'pyram', etc.)",
                    "pattern": "^[0-9a-z]+$"
                },
                "type": {
                    "type": "string",
                    "description": "Whether to get single or average rankings",
                    "enum": ["single", "average"]
                },
                "page": {
                    "type": "integer",
                    "description": "Page number (default: 1)",
                    "minimum": 1
                }
            },
            "required": ["event", "type"],
            "additionalProperties": false
        })
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let args: RankingArgs = match serde_json::from_value(input) {
            Ok(args) => args,
            Err(error) => return ExecutionResult::invalid_input(error.to_string()),
        };
        let page = args.page.unwrap_or(1).to_string();
        lookup_result(
            self.client
                .get(
                    &format!("/rankings/{}/{}", args.event, args.ranking_type.as_str()),
                    &[("page", page.as_str())],
                )
                .await,
        )
    }
}

/// Get historical records for an event.
pub struct GetRecordsTool {
    client: WcaClient,
}

impl GetRecordsTool {
    pub fn new(client: WcaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetRecordsTool {
    fn name(&self) -> &str {
        "get_records"
    }

    fn description(&self) -> &str {
        "Get historical records (WR, CR, NR) for an event"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "event": {
                    "type": "string",
                    "description": "The event ID (e.g., '333', '222', '333oh', etc.)",
                    "pattern": "^[0-9a-z]+$"
                }
            },
            "required": ["event"],
            "additionalProperties": false
        })
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let args: EventArgs = match serde_json::from_value(input) {
            Ok(args) => args,
            Err(error) => return ExecutionResult::invalid_input(error.to_string()),
        };
        lookup_result(
            self.client
                .get(&format!("/records/{}", args.event), &[])
                .await,
        )
    }
}

/// List all WCA-recognized countries.
pub struct GetCountriesTool {
    client: WcaClient,
}

impl GetCountriesTool {
    pub fn new(client: WcaClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetCountriesTool {
    fn name(&self) -> &str {
        "get_countries"
    }

    fn description(&self) -> &str {
        "Get a list of all WCA-recognized countries"
    }

    fn input_schema(&self) -> Value {
        empty_schema()
    }

    async fn call(&self, _input: Value) -> ExecutionResult {
        lookup_result(self.client.get("/countries", &[]).await)
    }
}

/// Build a registry holding the full WCA tool suite.
pub fn wca_registry(client: WcaClient) -> Result<InMemoryToolRegistry, RegistryError> {
    InMemoryToolRegistry::new()
        .try_with_tool(Arc::new(GetPersonTool::new(client.clone())))?
        .try_with_tool(Arc::new(GetPersonResultsTool::new(client.clone())))?
        .try_with_tool(Arc::new(SearchPersonsTool::new(client.clone())))?
        .try_with_tool(Arc::new(GetCompetitionTool::new(client.clone())))?
        .try_with_tool(Arc::new(GetUpcomingCompetitionsTool::new(client.clone())))?
        .try_with_tool(Arc::new(GetCompetitionResultsTool::new(client.clone())))?
        .try_with_tool(Arc::new(GetWorldRankingsTool::new(client.clone())))?
        .try_with_tool(Arc::new(GetRecordsTool::new(client.clone())))?
        .try_with_tool(Arc::new(GetCountriesTool::new(client)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cubist_core::{ToolCall, ToolRegistry};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_registry(server: &MockServer) -> InMemoryToolRegistry {
        let client = WcaClient::with_base_url(server.uri()).expect("client builds");
        wca_registry(client).expect("registry builds")
    }

    #[tokio::test]
    async fn registry_contains_all_nine_tools() {
        let server = MockServer::start().await;
        let registry = test_registry(&server).await;
        assert_eq!(registry.len(), 9);
        assert_eq!(
            registry.tool_names(),
            vec![
                "get_competition",
                "get_competition_results",
                "get_countries",
                "get_person",
                "get_person_results",
                "get_records",
                "get_upcoming_competitions",
                "get_world_rankings",
                "search_persons",
            ]
        );
    }

    #[tokio::test]
    async fn get_person_hits_the_persons_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/persons/2012PARK03"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "person": { "name": "Max Park" }
            })))
            .mount(&server)
            .await;

        let registry = test_registry(&server).await;
        let call = ToolCall::new("call_1", "get_person", json!({ "wca_id": "2012PARK03" }));
        let result = registry.execute(&call).await;

        assert!(result.is_success());
        assert_eq!(
            result.outcome.output().and_then(|v| v.pointer("/person/name")),
            Some(&json!("Max Park"))
        );
    }

    #[tokio::test]
    async fn malformed_wca_id_is_rejected_before_any_request() {
        let server = MockServer::start().await;
        let registry = test_registry(&server).await;

        let call = ToolCall::new("call_1", "get_person", json!({ "wca_id": "not-an-id" }));
        let result = registry.execute(&call).await;

        assert_eq!(result.error_code(), Some("invalid_input"));
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn rankings_tool_builds_the_paged_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rankings/333/single"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "rows": [] })))
            .mount(&server)
            .await;

        let registry = test_registry(&server).await;
        let call = ToolCall::new(
            "call_1",
            "get_world_rankings",
            json!({ "event": "333", "type": "single", "page": 2 }),
        );
        let result = registry.execute(&call).await;

        assert!(result.is_success());
    }

    #[tokio::test]
    async fn failing_endpoint_surfaces_as_execution_failed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/records/333"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let registry = test_registry(&server).await;
        let call = ToolCall::new("call_1", "get_records", json!({ "event": "333" }));
        let result = registry.execute(&call).await;

        assert_eq!(result.error_code(), Some("execution_failed"));
    }
}
