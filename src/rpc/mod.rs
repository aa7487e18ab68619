//! Line-delimited JSON-RPC 2.0 plumbing.
//!
//! - `codec`: newline framing for stdin/stdout with a per-line size cap.
//! - `message`: request/response envelopes and the standard error codes.

pub mod codec;
pub mod message;

pub use message::{Response, RpcError};
