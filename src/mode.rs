//! Server mode: which backing CLI this bridge instance fronts.
//!
//! `ServerMode` is used as the `--mode` CLI flag value. Each mode exposes
//! exactly one tool named after the CLI it wraps.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Backing CLI selected at startup.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerMode {
    /// Code-generation CLI with plain-text output. Default mode.
    #[default]
    Codex,
    /// Conversational CLI with streamed JSON-lines output and native resume.
    Gemini,
}

impl ServerMode {
    /// Name of the single tool exposed in this mode.
    #[must_use]
    pub fn tool_name(self) -> &'static str {
        match self {
            Self::Codex => "codex",
            Self::Gemini => "gemini",
        }
    }

    /// Server identity reported in the `initialize` handshake.
    #[must_use]
    pub fn server_name(self) -> &'static str {
        match self {
            Self::Codex => "codex-mcp-server",
            Self::Gemini => "gemini-mcp-server",
        }
    }

    /// Whether the backing CLI reconstructs context itself from a resume token.
    #[must_use]
    pub fn resumes_natively(self) -> bool {
        matches!(self, Self::Gemini)
    }
}
