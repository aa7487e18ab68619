//! `tools/call` handler: the load, compose, invoke, save cycle.

use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tracing::{info, warn};

use super::handler::AppState;
use crate::driver::{CliReply, Invocation};
use crate::models::session::{generate_session_key, supplied_key};
use crate::prompt::compose;
use crate::rpc::RpcError;

/// Envelope of `tools/call` params.
#[derive(Debug, Deserialize)]
pub struct CallParams {
    /// Tool to invoke.
    pub name: Option<String>,
    /// Tool arguments; absent is treated as `{}`.
    #[serde(default)]
    pub arguments: Option<Value>,
}

/// Arguments accepted by both tools.
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CallArguments {
    /// Prompt text. Kept untyped so a non-string reads as missing.
    #[serde(default)]
    pub prompt: Option<Value>,
    /// Session key from an earlier call.
    #[serde(default, alias = "conversationId", alias = "SESSION_ID")]
    pub session_key: Option<String>,
    /// Model override.
    #[serde(default)]
    pub model: Option<String>,
    /// Request a sandboxed run.
    #[serde(default)]
    pub sandbox: bool,
    /// Echo every raw CLI record in the result metadata.
    #[serde(default, alias = "return_all_messages")]
    pub return_all_messages: bool,
}

impl CallArguments {
    /// Non-empty prompt text, if present.
    #[must_use]
    pub fn prompt_text(&self) -> Option<&str> {
        self.prompt
            .as_ref()
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty())
    }
}

/// Validate `params` and return the typed arguments.
///
/// # Errors
///
/// `-32602` for a missing name, malformed arguments, or a missing prompt;
/// `-32601` when the name is not this server's tool.
pub fn parse_call(tool_name: &str, params: Option<&Value>) -> Result<CallArguments, RpcError> {
    let params: CallParams = match params {
        Some(raw) => serde_json::from_value(raw.clone()).map_err(RpcError::invalid_params)?,
        None => return Err(RpcError::invalid_params("name is required")),
    };

    let Some(name) = params.name else {
        return Err(RpcError::invalid_params("name is required"));
    };
    if name != tool_name {
        return Err(RpcError::unknown_tool(&name));
    }

    let arguments: CallArguments = match params.arguments {
        None | Some(Value::Null) => CallArguments::default(),
        Some(raw @ Value::Object(_)) => {
            serde_json::from_value(raw).map_err(RpcError::invalid_params)?
        }
        Some(_) => return Err(RpcError::invalid_params("arguments must be an object")),
    };

    if arguments.prompt_text().is_none() {
        return Err(RpcError::invalid_params("prompt is required"));
    }
    Ok(arguments)
}

/// Serve one validated tool call.
///
/// # Errors
///
/// Any CLI failure becomes `-32603` carrying the failure's display text.
pub async fn execute(state: &AppState, arguments: &CallArguments) -> Result<Value, RpcError> {
    let prompt = arguments.prompt_text().unwrap_or_default().to_owned();
    let caller_key = supplied_key(arguments.session_key.as_deref()).map(str::to_owned);

    let mut history = state.store.load(caller_key.as_deref()).await;
    let composed = compose(state.mode, &prompt, &history, caller_key.as_deref());

    let model = arguments
        .model
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .or_else(|| state.driver.default_model())
        .map(str::to_owned);

    let invocation = Invocation {
        prompt: composed.text,
        model: model.clone(),
        resume_token: composed.resume_token,
        sandbox: arguments.sandbox,
    };

    let reply = state.driver.invoke(invocation).await.map_err(|err| {
        warn!(tool = state.mode.tool_name(), %err, "tool call failed");
        RpcError::internal(err.to_string())
    })?;

    let session_key = response_key(state, caller_key, &reply);
    history.record_exchange(prompt, reply.text.clone());
    state.store.save(&session_key, &history).await;

    info!(
        tool = state.mode.tool_name(),
        session_key,
        history_length = history.len(),
        "tool call completed"
    );

    Ok(call_result(
        &reply,
        &session_key,
        model.as_deref(),
        history.len(),
        arguments.return_all_messages,
    ))
}

/// Caller key, else the CLI's own non-blank session id for native-resume
/// CLIs, else a fresh key. Never empty.
fn response_key(state: &AppState, caller_key: Option<String>, reply: &CliReply) -> String {
    caller_key
        .or_else(|| {
            state
                .mode
                .resumes_natively()
                .then(|| supplied_key(reply.session_id.as_deref()).map(str::to_owned))
                .flatten()
        })
        .unwrap_or_else(|| generate_session_key(state.mode))
}

/// Render the MCP `tools/call` result object.
#[must_use]
pub fn call_result(
    reply: &CliReply,
    session_key: &str,
    model: Option<&str>,
    history_length: usize,
    include_all_messages: bool,
) -> Value {
    let mut metadata = Map::new();
    metadata.insert(
        "timestamp".into(),
        json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    metadata.insert("model".into(), json!(model.unwrap_or("default")));
    metadata.insert("historyLength".into(), json!(history_length));
    if let Some(id) = supplied_key(reply.session_id.as_deref()) {
        metadata.insert("cliSessionId".into(), json!(id));
    }
    if include_all_messages {
        metadata.insert("allMessages".into(), Value::Array(reply.raw_records.clone()));
    }

    json!({
        "content": [{ "type": "text", "text": reply.text }],
        "sessionKey": session_key,
        "metadata": metadata,
    })
}
