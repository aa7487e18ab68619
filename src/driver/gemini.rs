//! Driver for the streaming `gemini` CLI.
//!
//! Command line: `gemini <prompt> <default_args…> [--sandbox] [--model <m>]
//! [--resume <session>]`, with `-o stream-json` among the defaults so stdout
//! is a JSON-lines event log. The CLI keeps its own session state; passing
//! `--resume` is enough for continuity.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{info_span, warn, Instrument};

use super::stream::StreamTranscript;
use super::{CliDriver, CliReply, Invocation};
use crate::config::GlobalConfig;
use crate::mode::ServerMode;
use crate::process::{self, env, resolve, ProcessOutput, ProcessSpec};
use crate::{AppError, Result};

/// Streamed JSON-lines CLI driver.
#[derive(Debug, Clone)]
pub struct GeminiDriver {
    config: Arc<GlobalConfig>,
}

impl GeminiDriver {
    /// Create a driver over the shared configuration.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        Self { config }
    }

    /// Argument vector for `invocation`. The prompt is passed verbatim.
    #[must_use]
    pub fn build_args(&self, invocation: &Invocation) -> Vec<String> {
        let mut args = vec![invocation.prompt.clone()];
        args.extend(self.config.gemini.default_args.iter().cloned());
        if invocation.sandbox {
            args.push("--sandbox".into());
        }
        if let Some(model) = &invocation.model {
            args.push("--model".into());
            args.push(model.clone());
        }
        if let Some(session) = &invocation.resume_token {
            args.push("--resume".into());
            args.push(session.clone());
        }
        args
    }

    fn process_spec(&self, invocation: &Invocation) -> ProcessSpec {
        let program = resolve::resolve_program(
            &self.config.gemini.command,
            self.config.windows.prefer_cmd_extension,
        );
        ProcessSpec {
            label: ServerMode::Gemini.tool_name().to_owned(),
            args: self.build_args(invocation),
            program,
            env: env::current_env_overrides(&self.config, &self.config.gemini.environment),
            cwd: None,
            timeout: self.config.timeout(ServerMode::Gemini),
        }
    }
}

impl CliDriver for GeminiDriver {
    fn mode(&self) -> ServerMode {
        ServerMode::Gemini
    }

    fn default_model(&self) -> Option<&str> {
        self.config.gemini.model.as_deref()
    }

    fn invoke(
        &self,
        invocation: Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<CliReply>> + Send + '_>> {
        let span = info_span!(
            "gemini_invoke",
            prompt_chars = invocation.prompt.chars().count(),
            resume = invocation.resume_token.is_some()
        );
        Box::pin(
            async move {
                let spec = self.process_spec(&invocation);
                let output = process::run(&spec).await?;
                reply_from_output(&output)
            }
            .instrument(span),
        )
    }
}

/// Interpret a finished gemini run.
///
/// A non-zero exit is only a failure when no answer text was recovered;
/// partial streamed output is still returned to the caller.
///
/// # Errors
///
/// Returns `AppError::Cli` when the run failed without producing text. The
/// detail is stderr, else the last error record, else a generic message.
pub fn reply_from_output(output: &ProcessOutput) -> Result<CliReply> {
    let transcript = StreamTranscript::from_stdout(&output.stdout);

    if !output.success {
        if transcript.text.is_empty() {
            let detail = output
                .stderr_detail()
                .or(transcript.last_error.as_deref())
                .unwrap_or("unknown error");
            warn!(status = %output.status_text(), detail, "gemini reported failure");
            return Err(AppError::Cli(format!(
                "gemini exited with {}: {detail}",
                output.status_text()
            )));
        }
        warn!(
            status = %output.status_text(),
            chars = transcript.text.len(),
            "gemini exited unsuccessfully; returning partial output"
        );
    }

    Ok(CliReply {
        text: transcript.text,
        session_id: transcript.session_id,
        raw_records: transcript.records,
    })
}
