//! Request construction and dispatch

mod executor;
pub mod substitution;

pub use executor::{InvocationOutcome, RequestExecutor};
