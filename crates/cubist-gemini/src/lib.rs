//! # Cubist Gemini
//!
//! [`ModelProvider`] implementation for the Google Gemini
//! `streamGenerateContent` API (SSE).
//!
//! Each turn posts the query, the full step history (model text and
//! `functionCall` parts, tool results as `functionResponse` parts — failed
//! results included, as data), and the registry's function declarations,
//! then maps the SSE response onto [`TurnEvent`]s. Gemini does not assign
//! tool-call ids, so this provider synthesizes them.

mod sse;

use cubist_core::ProviderError;
use cubist_core::provider::{ModelProvider, TurnRequest, TurnSender, TurnStream};
use cubist_core::tool::{ExecutionResult, ToolCall, ToolResult};
use futures::StreamExt;
use serde_json::{Value, json};
use std::time::Duration;
use uuid::Uuid;

/// Canonical Gemini API base URL.
pub const GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model used when the caller does not pick one.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_BODY_BYTES: usize = 2 * 1024;

/// Streaming Gemini client implementing the model capability boundary.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Create a provider for `model` authenticated with `api_key`.
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        Self::with_base_url(api_key, model, GEMINI_API_BASE_URL)
    }

    /// Create a provider against a custom base URL (used by tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Request(e.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    /// The model this provider targets.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait::async_trait]
impl ModelProvider for GeminiProvider {
    async fn begin_turn(&self, request: TurnRequest<'_>) -> Result<TurnStream, ProviderError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        );
        let body = build_request_body(&request);

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: truncate_message(message),
            });
        }

        let (tx, stream) = TurnStream::channel();
        tokio::spawn(drive_turn(response, tx));
        Ok(stream)
    }
}

/// Build the `generateContent` request body from a turn request.
///
/// Gemini's casing is mixed: `contents`/`tools` are lowercase while
/// `generationConfig` and part fields are camelCase.
fn build_request_body(request: &TurnRequest<'_>) -> Value {
    let mut contents = vec![json!({
        "role": "user",
        "parts": [{ "text": request.query }]
    })];

    for step in request.history {
        let mut model_parts: Vec<Value> = Vec::new();
        if !step.text.is_empty() {
            model_parts.push(json!({ "text": step.text }));
        }
        for call in &step.tool_calls {
            model_parts.push(json!({
                "functionCall": { "name": call.name, "args": call.input }
            }));
        }
        if !model_parts.is_empty() {
            contents.push(json!({ "role": "model", "parts": model_parts }));
        }

        if !step.tool_results.is_empty() {
            let parts: Vec<Value> = step
                .tool_results
                .iter()
                .map(|result| {
                    json!({
                        "functionResponse": {
                            "name": result.tool,
                            "response": function_response_payload(result)
                        }
                    })
                })
                .collect();
            contents.push(json!({ "role": "user", "parts": parts }));
        }
    }

    let mut body = json!({
        "contents": contents,
        "generationConfig": { "temperature": 1.0 }
    });

    if !request.tools.is_empty() {
        let declarations: Vec<Value> = request
            .tools
            .iter()
            .map(|tool| {
                let mut parameters = tool.parameters.clone();
                strip_additional_properties(&mut parameters);
                json!({
                    "name": tool.name,
                    "description": tool.description,
                    "parameters": parameters
                })
            })
            .collect();
        body["tools"] = json!([{ "functionDeclarations": declarations }]);
    }

    body
}

/// Payload of a `functionResponse` part. Failures are folded back as data so
/// the model can react to them in the next round.
fn function_response_payload(result: &ToolResult) -> Value {
    match &result.outcome {
        ExecutionResult::Success { output } => json!({ "result": output }),
        ExecutionResult::Failure { reason } => json!({
            "error": reason.code(),
            "message": reason.message()
        }),
    }
}

/// Gemini rejects `additionalProperties` in function declarations.
fn strip_additional_properties(value: &mut Value) {
    match value {
        Value::Object(map) => {
            map.remove("additionalProperties");
            for value in map.values_mut() {
                strip_additional_properties(value);
            }
        }
        Value::Array(values) => {
            for value in values {
                strip_additional_properties(value);
            }
        }
        _ => {}
    }
}

fn truncate_message(mut message: String) -> String {
    if message.len() > MAX_ERROR_BODY_BYTES {
        let mut end = MAX_ERROR_BODY_BYTES;
        while end > 0 && !message.is_char_boundary(end) {
            end -= 1;
        }
        message.truncate(end);
    }
    message
}

// ========================================================================
// SSE response handling
// ========================================================================

#[derive(serde::Deserialize)]
struct StreamResponse {
    error: Option<ApiError>,
    candidates: Option<Vec<Candidate>>,
}

#[derive(serde::Deserialize)]
struct ApiError {
    message: Option<String>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(serde::Deserialize)]
struct Content {
    parts: Option<Vec<Part>>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    function_call: Option<FunctionCall>,
}

#[derive(serde::Deserialize)]
struct FunctionCall {
    name: Option<String>,
    args: Option<Value>,
}

/// What to do after applying one SSE payload.
enum Drive {
    Continue,
    Finished,
    Failed(ProviderError),
    ConsumerGone,
}

/// Read the SSE body and forward turn events until the stream ends.
async fn drive_turn(response: reqwest::Response, tx: TurnSender) {
    let mut bytes = response.bytes_stream();
    let mut buffer = sse::EventBuffer::new();

    while let Some(chunk) = bytes.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(error) => {
                let _ = tx.failed(ProviderError::Stream(error.to_string())).await;
                return;
            }
        };
        if buffer.extend(&chunk).is_err() {
            let _ = tx
                .failed(ProviderError::Stream(
                    "SSE buffer limit exceeded".to_string(),
                ))
                .await;
            return;
        }

        while let Some(event) = buffer.next_event() {
            let Some(payload) = sse::event_data(&event) else {
                continue;
            };
            match apply_payload(&payload, &tx).await {
                Drive::Continue => {}
                Drive::Finished => {
                    let _ = tx.finished().await;
                    return;
                }
                Drive::Failed(error) => {
                    let _ = tx.failed(error).await;
                    return;
                }
                Drive::ConsumerGone => return,
            }
        }
    }

    // The HTTP stream closed without a terminal finishReason.
    let _ = tx.failed(ProviderError::Interrupted).await;
}

/// Apply one `data:` payload, forwarding fragments and tool calls.
async fn apply_payload(payload: &str, tx: &TurnSender) -> Drive {
    let response: StreamResponse = match serde_json::from_str(payload) {
        Ok(response) => response,
        Err(error) => {
            tracing::warn!(%error, "skipping unparsable Gemini SSE event");
            return Drive::Continue;
        }
    };

    if let Some(error) = response.error {
        let message = error
            .message
            .unwrap_or_else(|| "unknown provider error".to_string());
        return Drive::Failed(ProviderError::Stream(message));
    }

    let mut finished = false;
    for candidate in response.candidates.unwrap_or_default() {
        // Content comes before the finish reason so final parts are not
        // dropped when both arrive in one event.
        for part in candidate
            .content
            .and_then(|content| content.parts)
            .unwrap_or_default()
        {
            // Thought parts are reasoning, not answer text.
            if let Some(text) = part.text
                && !part.thought
                && tx.fragment(text).await.is_err()
            {
                return Drive::ConsumerGone;
            }

            if let Some(function_call) = part.function_call {
                let name = function_call.name.unwrap_or_default();
                if name.is_empty() {
                    tracing::warn!("Gemini function call with empty name, skipping");
                    continue;
                }
                let call = ToolCall::new(
                    format!("call_{}", Uuid::new_v4()),
                    name,
                    function_call.args.unwrap_or_else(|| json!({})),
                );
                if tx.tool_call(call).await.is_err() {
                    return Drive::ConsumerGone;
                }
            }
        }

        if let Some(reason) = candidate.finish_reason {
            match reason.as_str() {
                "STOP" => finished = true,
                "MAX_TOKENS" | "SAFETY" | "RECITATION" | "BLOCKLIST" | "PROHIBITED_CONTENT"
                | "MALFORMED_FUNCTION_CALL" => {
                    return Drive::Failed(ProviderError::Stream(format!(
                        "model stopped: {reason}"
                    )));
                }
                other => {
                    tracing::warn!(reason = other, "unrecognized Gemini finish reason");
                }
            }
        }
    }

    if finished {
        Drive::Finished
    } else {
        Drive::Continue
    }
}
