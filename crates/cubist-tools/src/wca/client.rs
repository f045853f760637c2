//! Async client for the public WCA REST API.

use serde_json::Value;
use std::time::Duration;

/// Base URL of the public WCA API.
pub const WCA_BASE_URL: &str = "https://www.worldcubeassociation.org/api/v0";

/// Request timeout. Transport hygiene only; the orchestration layer itself
/// enforces no per-call deadline.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the WCA data-source boundary.
///
/// Every non-success is surfaced to the caller as-is; the client performs
/// no retries.
#[derive(Debug, Clone, thiserror::Error)]
pub enum WcaError {
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),

    /// The request could not be sent or timed out.
    #[error("WCA request failed: {0}")]
    Request(String),

    /// The API answered with a non-success status.
    #[error("WCA API error: {status} for {path}")]
    Status { status: u16, path: String },

    /// The response body was not valid JSON.
    #[error("WCA response could not be decoded: {0}")]
    Decode(String),
}

/// Asynchronous keyed lookup against the WCA API.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct WcaClient {
    http: reqwest::Client,
    base_url: String,
}

impl WcaClient {
    /// Create a client against the public WCA API.
    pub fn new() -> Result<Self, WcaError> {
        Self::with_base_url(WCA_BASE_URL)
    }

    /// Create a client against a custom base URL (used by tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, WcaError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cubist/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| WcaError::Client(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Fetch a JSON document by path, with optional query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, WcaError> {
        let url = format!("{}{path}", self.base_url);
        tracing::debug!(%path, "WCA lookup");

        let mut request = self.http.get(&url);
        if !query.is_empty() {
            request = request.query(query);
        }

        let response = request
            .send()
            .await
            .map_err(|e| WcaError::Request(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(WcaError::Status {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| WcaError::Decode(e.to_string()))
    }
}
