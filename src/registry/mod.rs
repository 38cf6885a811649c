//! Tool server registry

mod service;

pub use service::{ServerRegistry, ServerStatus, ToolServer, ToolSummary};
