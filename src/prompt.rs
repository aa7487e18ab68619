//! Outbound prompt composition.
//!
//! A CLI without native resume gets the stored history replayed in front of
//! the new prompt. A CLI with native resume gets the bare prompt plus the
//! session key as a resume token, and rebuilds its own context.

use crate::mode::ServerMode;
use crate::models::conversation::ConversationHistory;

/// Header placed before replayed turns.
pub const HISTORY_HEADER: &str = "Previous conversation:";

/// Header placed before the new prompt when history is replayed.
pub const REQUEST_HEADER: &str = "Current request:";

const TURN_SEPARATOR: &str = "\n\n---\n\n";

/// Prompt text and optional resume token for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    /// Text handed to the CLI as its prompt argument.
    pub text: String,
    /// Session identifier the CLI should resume, if any.
    pub resume_token: Option<String>,
}

/// Build the outbound prompt for `mode`.
///
/// `session_key` is the caller-supplied key, if any.
#[must_use]
pub fn compose(
    mode: ServerMode,
    prompt: &str,
    history: &ConversationHistory,
    session_key: Option<&str>,
) -> ComposedPrompt {
    if mode.resumes_natively() {
        ComposedPrompt {
            text: prompt.to_owned(),
            resume_token: session_key.map(str::to_owned),
        }
    } else {
        ComposedPrompt {
            text: replay_history(prompt, history),
            resume_token: None,
        }
    }
}

/// Prefix `prompt` with the rendered history. Empty history passes the
/// prompt through unchanged.
#[must_use]
pub fn replay_history(prompt: &str, history: &ConversationHistory) -> String {
    if history.is_empty() {
        return prompt.to_owned();
    }

    let rendered = history
        .iter()
        .map(|turn| format!("{}: {}", turn.role.label(), turn.content))
        .collect::<Vec<_>>()
        .join(TURN_SEPARATOR);

    format!("{HISTORY_HEADER}\n\n{rendered}{TURN_SEPARATOR}{REQUEST_HEADER}\n{prompt}")
}
