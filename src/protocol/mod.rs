//! Bridge invocation protocol
//!
//! JSON-RPC 2.0 envelopes, numeric error codes and the method dispatcher.

mod handler;
mod types;

pub use handler::ProtocolHandler;
pub use types::{BridgeRequest, BridgeResponse, ErrorCode, ProtocolError};
