//! Request dispatch and shared application state.

use std::sync::Arc;

use serde_json::{json, Map, Value};
use tracing::{debug, info, info_span, warn, Instrument};

use super::call;
use super::tools::tool_definition;
use crate::config::GlobalConfig;
use crate::driver::{driver_for, CliDriver};
use crate::mode::ServerMode;
use crate::persistence::ContextStore;
use crate::rpc::message::JSONRPC_VERSION;
use crate::rpc::{Response, RpcError};

/// Protocol revision reported in the `initialize` handshake.
pub const PROTOCOL_VERSION: &str = "2025-06-18";

const NOTIFICATION_PREFIX: &str = "notifications/";

/// Shared application state used by every request.
pub struct AppState {
    /// Global configuration.
    pub config: Arc<GlobalConfig>,
    /// Backing CLI fronted by this process.
    pub mode: ServerMode,
    /// Conversation history store for `mode`.
    pub store: ContextStore,
    /// Launcher for the backing CLI.
    pub driver: Arc<dyn CliDriver>,
}

impl AppState {
    /// Assemble state for `mode` from the configuration snapshot.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>, mode: ServerMode) -> Self {
        let store = ContextStore::new(config.context_dir(mode));
        let driver = driver_for(mode, Arc::clone(&config));
        Self {
            config,
            mode,
            store,
            driver,
        }
    }

    /// Same as [`AppState::new`] but with a caller-provided driver.
    #[must_use]
    pub fn with_driver(
        config: Arc<GlobalConfig>,
        mode: ServerMode,
        store: ContextStore,
        driver: Arc<dyn CliDriver>,
    ) -> Self {
        Self {
            config,
            mode,
            store,
            driver,
        }
    }
}

/// JSON-RPC front end for one backing CLI.
#[derive(Clone)]
pub struct BridgeServer {
    state: Arc<AppState>,
}

impl BridgeServer {
    /// Create a server bound to shared application state.
    #[must_use]
    pub fn new(state: Arc<AppState>) -> Self {
        Self { state }
    }

    /// Access the shared application state.
    #[must_use]
    pub fn state(&self) -> &Arc<AppState> {
        &self.state
    }

    /// Handle one raw input line. `None` means nothing is written back,
    /// either because the line was blank or it carried a notification.
    pub async fn handle_line(&self, line: &str) -> Option<Response> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => self.handle_value(value).await,
            Err(err) => {
                warn!(%err, "unparseable request line");
                Some(Response::failure(Value::Null, RpcError::parse(err)))
            }
        }
    }

    /// Handle one parsed JSON value.
    pub async fn handle_value(&self, value: Value) -> Option<Response> {
        let Value::Object(request) = value else {
            return Some(Response::failure(
                Value::Null,
                RpcError::invalid_request("request must be a JSON object"),
            ));
        };

        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let method = request.get("method").and_then(Value::as_str);

        if method.is_some_and(|m| m.starts_with(NOTIFICATION_PREFIX)) {
            debug!(method, "notification received");
            return None;
        }

        if let Some(version) = request.get("jsonrpc") {
            if version.as_str() != Some(JSONRPC_VERSION) {
                return Some(Response::failure(
                    id,
                    RpcError::invalid_request("jsonrpc must be \"2.0\""),
                ));
            }
        }

        let Some(method) = method else {
            return Some(Response::failure(
                id,
                RpcError::invalid_request("method must be a string"),
            ));
        };

        let span = info_span!("rpc_request", method, id = %id);
        let result = self
            .dispatch(method, request.get("params"))
            .instrument(span)
            .await;
        Some(Response::from_result(id, result))
    }

    async fn dispatch(&self, method: &str, params: Option<&Value>) -> Result<Value, RpcError> {
        match method {
            "initialize" => Ok(self.initialize(params)),
            "ping" => Ok(Value::Object(Map::new())),
            "tools/list" => Ok(json!({ "tools": [tool_definition(self.state.mode)] })),
            "tools/call" => {
                let arguments = call::parse_call(self.state.mode.tool_name(), params)?;
                call::execute(&self.state, &arguments).await
            }
            other => Err(RpcError::method_not_found(other)),
        }
    }

    fn initialize(&self, params: Option<&Value>) -> Value {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str)
            .unwrap_or("unspecified");
        info!(requested_protocol = requested, "initialize");

        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.state.mode.server_name(),
                "version": env!("CARGO_PKG_VERSION"),
            },
        })
    }
}
