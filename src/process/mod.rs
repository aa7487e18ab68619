//! Backing-CLI subprocess plumbing.
//!
//! - `runner`: launches a process from a [`runner::ProcessSpec`], drains
//!   stdout/stderr concurrently, and enforces the configured time limit.
//! - `env`: computes environment overrides layered on the inherited
//!   environment.
//! - `escape`: shell-style rendering of an argument vector for logs.
//! - `resolve`: locates `.cmd`/`.bat`/`.exe` shims on `PATH` (Windows).

pub mod env;
pub mod escape;
pub mod resolve;
pub mod runner;

pub use runner::{run, ProcessOutput, ProcessSpec};
