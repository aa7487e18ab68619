//! Model Context Protocol server layer.

pub mod call;
pub mod handler;
pub mod tools;
pub mod transport;
