//! Global configuration parsing with silent fallback to built-in defaults.
//!
//! The configuration is loaded once at startup and shared as an immutable
//! snapshot (`Arc<GlobalConfig>`) with every component that needs it.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::mode::ServerMode;
use crate::{AppError, Result};

/// Outbound proxy applied to the backing CLI environment.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct ProxyConfig {
    /// Whether proxy variables are injected at all.
    pub enabled: bool,
    /// Fallback for `HTTP_PROXY` when the parent environment has none.
    pub http: String,
    /// Fallback for `HTTPS_PROXY` when the parent environment has none.
    pub https: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            http: "http://127.0.0.1:15236".into(),
            https: "http://127.0.0.1:15236".into(),
        }
    }
}

/// Settings for the plain-text `codex` CLI.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct CodexConfig {
    /// Executable name or path.
    pub command: String,
    /// Arguments placed before the sandbox flag and prompt.
    pub default_args: Vec<String>,
    /// Value for `--sandbox`.
    pub sandbox: String,
    /// Optional `approval_policy` override passed through `-c`.
    pub approval_policy: Option<String>,
    /// Model used when the caller does not name one.
    pub model: Option<String>,
    /// Subprocess time limit; 0 disables the limit.
    pub timeout_seconds: u64,
}

impl Default for CodexConfig {
    fn default() -> Self {
        Self {
            command: "codex".into(),
            default_args: vec!["exec".into(), "--skip-git-repo-check".into()],
            sandbox: "workspace-write".into(),
            approval_policy: None,
            model: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Settings for the streaming `gemini` CLI.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct GeminiConfig {
    /// Executable name or path.
    pub command: String,
    /// Arguments placed after the prompt.
    pub default_args: Vec<String>,
    /// Model used when the caller does not name one.
    pub model: Option<String>,
    /// Subprocess time limit; 0 disables the limit.
    pub timeout_seconds: u64,
    /// Fixed environment entries applied after the home override.
    pub environment: HashMap<String, String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            command: "gemini".into(),
            default_args: vec!["-o".into(), "stream-json".into(), "--yolo".into()],
            model: None,
            timeout_seconds: default_timeout_seconds(),
            environment: HashMap::from([("GEMINI_IDE_INTEGRATION".into(), "false".into())]),
        }
    }
}

/// Windows-only process launch tweaks. Ignored on other platforms.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct WindowsConfig {
    /// Set `HOME` to `USERPROFILE` for the child process.
    pub force_userprofile_as_home: bool,
    /// Resolve `.cmd`/`.bat`/`.exe` shims on `PATH` before launching.
    pub prefer_cmd_extension: bool,
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            force_userprofile_as_home: true,
            prefer_cmd_extension: true,
        }
    }
}

/// Operational log settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct LoggingConfig {
    /// Append operational events to `mcp-server.log` in the context directory.
    pub enabled: bool,
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".into(),
        }
    }
}

fn default_timeout_seconds() -> u64 {
    300
}

/// Global configuration parsed from `mcp-config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", default)]
pub struct GlobalConfig {
    /// Directory holding per-mode history and log files.
    ///
    /// Defaults to `~/.mcp-context` when absent.
    pub context_root: Option<PathBuf>,
    /// Proxy injection settings.
    pub proxy: ProxyConfig,
    /// `codex` CLI settings.
    pub codex: CodexConfig,
    /// `gemini` CLI settings.
    pub gemini: GeminiConfig,
    /// Windows launch tweaks.
    pub windows: WindowsConfig,
    /// Operational log settings.
    pub logging: LoggingConfig,
}

/// Where the active configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from the given file.
    File(PathBuf),
    /// Built-in defaults; carries the reason the file was not used.
    Defaults(String),
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent
    /// or unusable. Never fails; the returned [`ConfigSource`] says why.
    #[must_use]
    pub fn load_or_default(path: &Path) -> (Self, ConfigSource) {
        if !path.exists() {
            return (
                Self::default(),
                ConfigSource::Defaults(format!("{} not found", path.display())),
            );
        }
        match Self::load_from_path(path) {
            Ok(config) => (config, ConfigSource::File(path.to_path_buf())),
            Err(err) => (Self::default(), ConfigSource::Defaults(err.to_string())),
        }
    }

    /// Directory holding history records and the log file for `mode`.
    #[must_use]
    pub fn context_dir(&self, mode: ServerMode) -> PathBuf {
        let root = self
            .context_root
            .clone()
            .unwrap_or_else(default_context_root);
        root.join(mode.tool_name())
    }

    /// Subprocess time limit for `mode`; `None` when disabled.
    #[must_use]
    pub fn timeout(&self, mode: ServerMode) -> Option<std::time::Duration> {
        let seconds = match mode {
            ServerMode::Codex => self.codex.timeout_seconds,
            ServerMode::Gemini => self.gemini.timeout_seconds,
        };
        (seconds > 0).then_some(std::time::Duration::from_secs(seconds))
    }

    fn validate(&self) -> Result<()> {
        if self.codex.command.trim().is_empty() {
            return Err(AppError::Config("codex.command must not be empty".into()));
        }
        if self.gemini.command.trim().is_empty() {
            return Err(AppError::Config("gemini.command must not be empty".into()));
        }
        if self.codex.sandbox.trim().is_empty() {
            return Err(AppError::Config("codex.sandbox must not be empty".into()));
        }
        Ok(())
    }
}

fn default_context_root() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(|| PathBuf::from("."), PathBuf::from)
        .join(".mcp-context")
}
