//! Backing-CLI process runner.
//!
//! Launches one subprocess per tool call with:
//! - an explicit argument vector and no shell in between,
//! - the inherited environment plus the overrides from [`super::env`],
//! - stdin closed, stdout and stderr piped and drained concurrently,
//! - `kill_on_drop(true)`, so a timed-out or cancelled call never leaves the
//!   child running.
//!
//! The runner only reports what happened. Whether a non-zero exit is a
//! failure is decided by the driver that interprets the output.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::Command;
use tracing::{debug, info, warn};

use super::escape;
use crate::{AppError, Result};

/// Everything needed to launch one subprocess.
#[derive(Debug, Clone)]
pub struct ProcessSpec {
    /// Short name used in log fields and error messages (e.g. `codex`).
    pub label: String,
    /// Resolved executable.
    pub program: PathBuf,
    /// Argument vector, excluding the program itself.
    pub args: Vec<String>,
    /// Environment overrides applied on top of the inherited environment.
    pub env: Vec<(String, String)>,
    /// Working directory; `None` keeps the server's own.
    pub cwd: Option<PathBuf>,
    /// Wall-clock limit; `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// Captured result of a finished subprocess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, or `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Complete stdout, lossily decoded as UTF-8.
    pub stdout: String,
    /// Complete stderr, lossily decoded as UTF-8.
    pub stderr: String,
}

impl ProcessOutput {
    /// Human-readable exit status, e.g. `exit code 2`.
    #[must_use]
    pub fn status_text(&self) -> String {
        self.exit_code.map_or_else(
            || "termination by signal".to_owned(),
            |code| format!("exit code {code}"),
        )
    }

    /// Trimmed stderr, or `None` when it is blank.
    #[must_use]
    pub fn stderr_detail(&self) -> Option<&str> {
        let trimmed = self.stderr.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

/// Run `spec` to completion and capture its output.
///
/// Resolves once the process has exited and both pipes are fully drained.
///
/// # Errors
///
/// - `AppError::Launch("cannot start …")`: the executable could not be
///   started (missing, not executable, …).
/// - `AppError::Timeout("… timed out after …")`: the limit elapsed; the
///   child is killed.
/// - `AppError::Io`: collecting output failed.
pub async fn run(spec: &ProcessSpec) -> Result<ProcessOutput> {
    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .envs(spec.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(cwd) = &spec.cwd {
        cmd.current_dir(cwd);
    }

    let child = cmd.spawn().map_err(|err| {
        warn!(label = spec.label, program = %spec.program.display(), %err, "cli launch failed");
        AppError::Launch(format!("cannot start {}: {err}", spec.program.display()))
    })?;

    info!(
        label = spec.label,
        pid = child.id().unwrap_or(0),
        argc = spec.args.len(),
        "cli process started"
    );
    debug!(
        label = spec.label,
        command = %escape::command_line(&spec.program, &spec.args),
        "cli command line"
    );

    let started = Instant::now();
    let collected = match spec.timeout {
        Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
            Ok(result) => result,
            Err(_elapsed) => {
                // Dropping the wait future drops the child, which kills it.
                warn!(label = spec.label, limit_secs = limit.as_secs(), "cli process timed out");
                return Err(AppError::Timeout(format!(
                    "{} timed out after {}s",
                    spec.label,
                    limit.as_secs()
                )));
            }
        },
        None => child.wait_with_output().await,
    };

    let output = collected
        .map_err(|err| AppError::Io(format!("failed to collect {} output: {err}", spec.label)))?;

    let result = ProcessOutput {
        exit_code: output.status.code(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    };

    info!(
        label = spec.label,
        status = %result.status_text(),
        stdout_bytes = result.stdout.len(),
        stderr_bytes = result.stderr.len(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "cli process finished"
    );
    if let Some(stderr) = result.stderr_detail() {
        debug!(label = spec.label, stderr, "cli stderr");
    }

    Ok(result)
}
