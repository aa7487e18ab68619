//! Error types shared across the application.

use std::fmt::{Display, Formatter};

/// Shared application result type.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error enumeration covering all domain failure modes.
#[derive(Debug)]
pub enum AppError {
    /// Configuration parsing or validation failure.
    Config(String),
    /// File-system or stream I/O failure.
    Io(String),
    /// The backing CLI executable could not be started.
    Launch(String),
    /// The backing CLI ran but reported failure.
    Cli(String),
    /// The backing CLI did not finish within the configured limit.
    Timeout(String),
    /// Conversation history could not be read or written.
    Store(String),
    /// JSON-RPC framing or protocol failure.
    Rpc(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Io(msg) => write!(f, "io: {msg}"),
            Self::Launch(msg) => write!(f, "launch: {msg}"),
            Self::Cli(msg) => write!(f, "cli: {msg}"),
            Self::Timeout(msg) => write!(f, "timeout: {msg}"),
            Self::Store(msg) => write!(f, "store: {msg}"),
            Self::Rpc(msg) => write!(f, "rpc: {msg}"),
        }
    }
}

impl std::error::Error for AppError {}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        Self::Config(format!("invalid config: {err}"))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::Rpc(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
