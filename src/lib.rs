//! # RestBridge
//!
//! Turns OpenAPI and Swagger documents into named, callable tool servers.
//! A specification is normalized into a dialect-independent set of tool
//! descriptors; descriptors plus an auth profile become tools; tools are
//! grouped into servers in a registry and invoked over a small JSON-RPC
//! protocol that proxies each call to the upstream HTTP API.
//!
//! ```no_run
//! use restbridge::auth::AuthProfile;
//! use restbridge::config::BridgeConfig;
//! use restbridge::registry::ServerRegistry;
//! use restbridge::spec::SpecNormalizer;
//!
//! # async fn run(document: &str) -> restbridge::Result<()> {
//! let normalized = SpecNormalizer::new().normalize(document)?;
//! let base_url = normalized.api.base_url.clone().unwrap_or_default();
//!
//! let registry = ServerRegistry::new(&BridgeConfig::default())?;
//! registry
//!     .create_server("petstore", normalized.descriptors, &AuthProfile::none(), &base_url)
//!     .await?;
//! registry.start_server("petstore").await?;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod routing;
pub mod spec;
pub mod tools;

pub use config::BridgeConfig;
pub use error::{BridgeError, Result};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "restbridge.yaml";
