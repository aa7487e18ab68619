//! Static tool definitions, one per server mode.

use serde::Serialize;
use serde_json::{json, Value};

use crate::mode::ServerMode;

/// Tool descriptor returned by `tools/list`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name used in `tools/call`.
    pub name: &'static str,
    /// Human-readable description shown to the orchestrator.
    pub description: &'static str,
    /// JSON Schema of the `arguments` object.
    pub input_schema: Value,
}

/// The single tool exposed in `mode`.
#[must_use]
pub fn tool_definition(mode: ServerMode) -> ToolDefinition {
    match mode {
        ServerMode::Codex => ToolDefinition {
            name: "codex",
            description: "Run the Codex CLI to generate code or technical documents. \
                          Pass the same sessionKey across calls to continue a \
                          multi-turn conversation; prior turns are replayed as context.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "Instruction for Codex describing the code or document to produce."
                    },
                    "sessionKey": {
                        "type": "string",
                        "description": "Optional session key. Reuse it to share conversation history between calls."
                    },
                    "model": {
                        "type": "string",
                        "description": "Optional model name passed to the CLI."
                    }
                },
                "required": ["prompt"]
            }),
        },
        ServerMode::Gemini => ToolDefinition {
            name: "gemini",
            description: "Run the Gemini CLI for code review, UI design, and technical Q&A. \
                          Pass the returned sessionKey to resume the CLI's own session \
                          in a later call.",
            input_schema: json!({
                "type": "object",
                "properties": {
                    "prompt": {
                        "type": "string",
                        "description": "Prompt for Gemini."
                    },
                    "sessionKey": {
                        "type": "string",
                        "description": "Optional session key returned by an earlier call; resumes that session."
                    },
                    "model": {
                        "type": "string",
                        "description": "Optional model name passed to the CLI."
                    },
                    "sandbox": {
                        "type": "boolean",
                        "description": "Run the CLI in sandbox mode."
                    },
                    "returnAllMessages": {
                        "type": "boolean",
                        "description": "Include every raw event emitted by the CLI in the result metadata."
                    }
                },
                "required": ["prompt"]
            }),
        },
    }
}
