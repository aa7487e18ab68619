//! Domain models for conversation history and session identity.

pub mod conversation;
pub mod session;
