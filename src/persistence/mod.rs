//! Persistence layer modules.

pub mod context_store;
pub mod record_path;

pub use context_store::ContextStore;
