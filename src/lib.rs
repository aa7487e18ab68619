#![forbid(unsafe_code)]

//! MCP stdio bridge that exposes a code-assistant CLI as a single tool and
//! keeps per-session conversation context on disk.

pub mod config;
pub mod driver;
pub mod errors;
pub mod mcp;
pub mod mode;
pub mod models;
pub mod persistence;
pub mod process;
pub mod prompt;
pub mod rpc;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
