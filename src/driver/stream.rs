//! Normalizer for the streamed JSON-lines output of the gemini CLI.
//!
//! Every stdout line is an independent record. Records are classified as
//! follows:
//!
//! | Line                                               | Effect                                   |
//! |----------------------------------------------------|------------------------------------------|
//! | any JSON value                                     | kept in `records`                        |
//! | JSON with string `session_id`                      | overwrites `session_id`                  |
//! | `type: "message"`, `role: "assistant"`             | string `content` appended to `text`      |
//! | `type: "error"`                                    | string `message` kept as `last_error`    |
//! | not JSON, no `ERROR` marker                        | line + `\n` appended to `text`           |
//! | blank, or not JSON with an `ERROR` marker          | skipped                                  |
//!
//! Assistant content carrying the CLI's `--prompt` deprecation notice is
//! dropped entirely.

use serde_json::Value;

/// Substring identifying the CLI's deprecation notice in assistant content.
pub const DEPRECATION_NOTICE: &str = "--prompt (-p) flag has been deprecated";

/// Non-JSON lines containing this marker are treated as noise.
pub const ERROR_MARKER: &str = "ERROR";

/// Accumulated view of one streamed CLI run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamTranscript {
    /// Concatenated assistant text plus raw-text fallback lines.
    pub text: String,
    /// Most recent session identifier reported by the CLI.
    pub session_id: Option<String>,
    /// Every line that parsed as JSON, in order.
    pub records: Vec<Value>,
    /// Message of the most recent `type: "error"` record.
    pub last_error: Option<String>,
}

impl StreamTranscript {
    /// Normalize a complete stdout capture.
    #[must_use]
    pub fn from_stdout(stdout: &str) -> Self {
        let mut transcript = Self::default();
        for line in stdout.split('\n') {
            transcript.push_line(line);
        }
        transcript
    }

    /// Feed one raw stdout line.
    pub fn push_line(&mut self, raw: &str) {
        let line = raw.trim();
        if line.is_empty() {
            return;
        }

        match serde_json::from_str::<Value>(line) {
            Ok(record) => {
                self.absorb(&record);
                self.records.push(record);
            }
            Err(_) => {
                if !line.contains(ERROR_MARKER) {
                    self.text.push_str(line);
                    self.text.push('\n');
                }
            }
        }
    }

    fn absorb(&mut self, record: &Value) {
        if let Some(id) = record
            .get("session_id")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty())
        {
            self.session_id = Some(id.to_owned());
        }

        let kind = record.get("type").and_then(Value::as_str).unwrap_or_default();
        match kind {
            "message" if record.get("role").and_then(Value::as_str) == Some("assistant") => {
                let content = record.get("content").and_then(Value::as_str).unwrap_or_default();
                if !content.contains(DEPRECATION_NOTICE) {
                    self.text.push_str(content);
                }
            }
            "error" => {
                if let Some(message) = record.get("message").and_then(Value::as_str) {
                    self.last_error = Some(message.to_owned());
                }
            }
            _ => {}
        }
    }
}
