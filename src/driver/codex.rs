//! Driver for the plain-text `codex` CLI.
//!
//! Command line: `codex <default_args…> --sandbox <mode> [-c approval_policy=<p>]
//! <prompt> [--model <m>]`. The CLI has no resume flag, so conversation
//! continuity comes entirely from history replayed into the prompt.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tracing::{info_span, warn, Instrument};

use super::{CliDriver, CliReply, Invocation};
use crate::config::GlobalConfig;
use crate::mode::ServerMode;
use crate::process::{self, env, resolve, ProcessOutput, ProcessSpec};
use crate::{AppError, Result};

/// Plain-text CLI driver.
#[derive(Debug, Clone)]
pub struct CodexDriver {
    config: Arc<GlobalConfig>,
}

impl CodexDriver {
    /// Create a driver over the shared configuration.
    #[must_use]
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        Self { config }
    }

    /// Argument vector for `invocation`. The prompt is passed verbatim.
    #[must_use]
    pub fn build_args(&self, invocation: &Invocation) -> Vec<String> {
        let codex = &self.config.codex;
        let mut args = codex.default_args.clone();
        args.push("--sandbox".into());
        args.push(codex.sandbox.clone());
        if let Some(policy) = codex.approval_policy.as_deref().filter(|p| !p.is_empty()) {
            args.push("-c".into());
            args.push(format!("approval_policy={policy}"));
        }
        args.push(invocation.prompt.clone());
        if let Some(model) = &invocation.model {
            args.push("--model".into());
            args.push(model.clone());
        }
        args
    }

    fn process_spec(&self, invocation: &Invocation) -> ProcessSpec {
        let program = resolve::resolve_program(
            &self.config.codex.command,
            self.config.windows.prefer_cmd_extension,
        );
        ProcessSpec {
            label: ServerMode::Codex.tool_name().to_owned(),
            args: self.build_args(invocation),
            program,
            env: env::current_env_overrides(&self.config, &HashMap::new()),
            cwd: None,
            timeout: self.config.timeout(ServerMode::Codex),
        }
    }
}

impl CliDriver for CodexDriver {
    fn mode(&self) -> ServerMode {
        ServerMode::Codex
    }

    fn default_model(&self) -> Option<&str> {
        self.config.codex.model.as_deref()
    }

    fn invoke(
        &self,
        invocation: Invocation,
    ) -> Pin<Box<dyn Future<Output = Result<CliReply>> + Send + '_>> {
        let span = info_span!("codex_invoke", prompt_chars = invocation.prompt.chars().count());
        Box::pin(
            async move {
                let spec = self.process_spec(&invocation);
                let output = process::run(&spec).await?;
                reply_from_output(output)
            }
            .instrument(span),
        )
    }
}

/// Interpret a finished codex run.
///
/// # Errors
///
/// Returns `AppError::Cli` on a non-zero exit, carrying stderr (or a generic
/// message when stderr is blank).
pub fn reply_from_output(output: ProcessOutput) -> Result<CliReply> {
    if !output.success {
        let detail = output.stderr_detail().unwrap_or("unknown error");
        warn!(status = %output.status_text(), detail, "codex reported failure");
        return Err(AppError::Cli(format!(
            "codex exited with {}: {detail}",
            output.status_text()
        )));
    }

    Ok(CliReply {
        text: output.stdout,
        session_id: None,
        raw_records: Vec::new(),
    })
}
