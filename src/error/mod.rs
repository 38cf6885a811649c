//! Error handling module for RestBridge

mod error;

// Re-export the main error types and utilities
pub use error::{BridgeError, NetworkFailure, Result};
