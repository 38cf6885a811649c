//! Tool construction

mod factory;

pub use factory::{Tool, ToolFactory};
