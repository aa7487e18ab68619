//! Session key generation.

use chrono::Utc;
use uuid::Uuid;

use crate::mode::ServerMode;

/// Mint a fresh session key for `mode`.
///
/// Keys look like `codex_1718000000000_9f1c2ab4`: the tool name, the current
/// Unix time in milliseconds, and eight hex digits of a random v4 UUID so
/// two calls in the same millisecond still get distinct keys.
#[must_use]
pub fn generate_session_key(mode: ServerMode) -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}_{millis}_{}", mode.tool_name(), &suffix[..8])
}

/// Treat blank caller-supplied keys as absent. Non-blank keys are returned
/// verbatim so the caller gets back exactly what it sent.
#[must_use]
pub fn supplied_key(raw: Option<&str>) -> Option<&str> {
    raw.filter(|key| !key.trim().is_empty())
}
