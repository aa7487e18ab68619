//! Backing-CLI driver abstraction.
//!
//! The [`CliDriver`] trait hides how a particular CLI is launched and how
//! its output is read. The tool-call handler only sees an [`Invocation`]
//! going in and a [`CliReply`] coming out.
//!
//! - [`codex::CodexDriver`]: plain-text stdout is the answer.
//! - [`gemini::GeminiDriver`]: stdout is a JSON-lines event stream,
//!   normalized by [`stream::StreamTranscript`].

pub mod codex;
pub mod gemini;
pub mod stream;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde_json::Value;

use crate::config::GlobalConfig;
use crate::mode::ServerMode;
use crate::Result;

/// One request to the backing CLI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Prompt text as composed for this CLI.
    pub prompt: String,
    /// Model to request; `None` leaves the CLI default.
    pub model: Option<String>,
    /// Session the CLI should resume (native-resume CLIs only).
    pub resume_token: Option<String>,
    /// Ask the CLI to run sandboxed (gemini `--sandbox`).
    pub sandbox: bool,
}

/// Normalized answer from the backing CLI.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliReply {
    /// Answer text.
    pub text: String,
    /// Session identifier reported by the CLI, if any.
    pub session_id: Option<String>,
    /// Raw structured records emitted by the CLI, in order.
    pub raw_records: Vec<Value>,
}

/// Uniform interface over the supported CLIs.
pub trait CliDriver: Send + Sync {
    /// Mode this driver serves.
    fn mode(&self) -> ServerMode;

    /// Model used when the caller does not name one.
    fn default_model(&self) -> Option<&str>;

    /// Run the CLI for `invocation` and normalize its output.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Launch`](crate::AppError::Launch) when the CLI
    /// cannot be started, [`AppError::Timeout`](crate::AppError::Timeout)
    /// when it exceeds the time limit, and [`AppError::Cli`](crate::AppError::Cli)
    /// when it reports failure.
    fn invoke(
        &self,
        invocation: Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<CliReply>> + Send + '_>>;
}

/// Build the driver for `mode` over the shared configuration snapshot.
#[must_use]
pub fn driver_for(mode: ServerMode, config: Arc<GlobalConfig>) -> Arc<dyn CliDriver> {
    match mode {
        ServerMode::Codex => Arc::new(codex::CodexDriver::new(config)),
        ServerMode::Gemini => Arc::new(gemini::GeminiDriver::new(config)),
    }
}
