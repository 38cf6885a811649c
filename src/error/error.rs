//! Error types and handling for RestBridge

use thiserror::Error;

/// Result type alias for RestBridge operations
pub type Result<T> = std::result::Result<T, BridgeError>;

/// Failure categories for network-level dispatch errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
    /// The upstream did not answer within the configured deadline
    Timeout,
    /// The connection could not be established
    Connect,
    /// Any other transport failure (DNS, TLS, dropped socket)
    Other,
}

impl NetworkFailure {
    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkFailure::Timeout => "timeout",
            NetworkFailure::Connect => "connect",
            NetworkFailure::Other => "other",
        }
    }
}

/// Main error type for RestBridge
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Spec content that is neither parseable JSON nor YAML, or carries no
    /// recognizable dialect marker
    #[error("Spec format error: {message}")]
    SpecFormat { message: String },

    /// Auth profile whose fields do not match its declared kind
    #[error("Auth profile mismatch: {message}")]
    AuthProfileMismatch { message: String },

    /// Invocation rejected before dispatch; every missing required argument
    /// is listed, not just the first
    #[error("Missing required arguments: {}", missing.join(", "))]
    MissingArguments { missing: Vec<String> },

    /// A path placeholder could not be resolved at request build time
    #[error("Path substitution error: {message}")]
    PathSubstitution { message: String },

    /// The upstream answered with a non-success HTTP status
    #[error("Upstream HTTP error: status {status}")]
    UpstreamHttp { status: u16, body: String },

    /// The request never produced an HTTP response
    #[error("Network error ({}): {message}", kind.as_str())]
    Network { kind: NetworkFailure, message: String },

    /// Registry lookup for an unknown server name
    #[error("Server '{name}' not found")]
    ServerNotFound { name: String },

    /// Invocation against a server that is not in the running state
    #[error("Server '{name}' is not running")]
    ServerNotRunning { name: String },

    /// Registration under a name that is already taken
    #[error("Server '{name}' already exists")]
    DuplicateServerName { name: String },

    /// Tool lookup miss within a running server
    #[error("Tool '{name}' not found")]
    ToolNotFound { name: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Registry errors
    #[error("Registry error: {message}")]
    Registry { message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Generic errors
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl BridgeError {
    /// Create a spec format error
    pub fn spec_format<S: Into<String>>(message: S) -> Self {
        Self::SpecFormat {
            message: message.into(),
        }
    }

    /// Create an auth profile mismatch error
    pub fn auth_mismatch<S: Into<String>>(message: S) -> Self {
        Self::AuthProfileMismatch {
            message: message.into(),
        }
    }

    /// Create a missing arguments error
    pub fn missing_arguments(missing: Vec<String>) -> Self {
        Self::MissingArguments { missing }
    }

    /// Create a path substitution error
    pub fn path_substitution<S: Into<String>>(message: S) -> Self {
        Self::PathSubstitution {
            message: message.into(),
        }
    }

    /// Create an upstream HTTP error
    pub fn upstream(status: u16, body: impl Into<String>) -> Self {
        Self::UpstreamHttp {
            status,
            body: body.into(),
        }
    }

    /// Create a network error
    pub fn network<S: Into<String>>(kind: NetworkFailure, message: S) -> Self {
        Self::Network {
            kind,
            message: message.into(),
        }
    }

    /// Create a server not found error
    pub fn server_not_found<S: Into<String>>(name: S) -> Self {
        Self::ServerNotFound { name: name.into() }
    }

    /// Create a server not running error
    pub fn server_not_running<S: Into<String>>(name: S) -> Self {
        Self::ServerNotRunning { name: name.into() }
    }

    /// Create a duplicate server name error
    pub fn duplicate_server<S: Into<String>>(name: S) -> Self {
        Self::DuplicateServerName { name: name.into() }
    }

    /// Create a tool not found error
    pub fn tool_not_found<S: Into<String>>(name: S) -> Self {
        Self::ToolNotFound { name: name.into() }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a registry error
    pub fn registry<S: Into<String>>(message: S) -> Self {
        Self::Registry {
            message: message.into(),
        }
    }

    /// Get the error category for logging/metrics
    pub fn category(&self) -> &'static str {
        match self {
            BridgeError::SpecFormat { .. } => "spec_format",
            BridgeError::AuthProfileMismatch { .. } => "auth",
            BridgeError::MissingArguments { .. } => "missing_arguments",
            BridgeError::PathSubstitution { .. } => "path_substitution",
            BridgeError::UpstreamHttp { .. } => "upstream_http",
            BridgeError::Network { .. } => "network",
            BridgeError::ServerNotFound { .. } => "server_not_found",
            BridgeError::ServerNotRunning { .. } => "server_not_running",
            BridgeError::DuplicateServerName { .. } => "duplicate_server",
            BridgeError::ToolNotFound { .. } => "tool_not_found",
            BridgeError::Validation { .. } => "validation",
            BridgeError::Config { .. } => "config",
            BridgeError::Registry { .. } => "registry",
            BridgeError::Io(_) => "io",
            BridgeError::Serde(_) => "serialization",
            BridgeError::Yaml(_) => "yaml",
            BridgeError::Http(_) => "http",
            BridgeError::Internal(_) => "internal",
        }
    }
}

impl Clone for BridgeError {
    fn clone(&self) -> Self {
        match self {
            BridgeError::SpecFormat { message } => BridgeError::SpecFormat { message: message.clone() },
            BridgeError::AuthProfileMismatch { message } => BridgeError::AuthProfileMismatch { message: message.clone() },
            BridgeError::MissingArguments { missing } => BridgeError::MissingArguments { missing: missing.clone() },
            BridgeError::PathSubstitution { message } => BridgeError::PathSubstitution { message: message.clone() },
            BridgeError::UpstreamHttp { status, body } => BridgeError::UpstreamHttp {
                status: *status,
                body: body.clone(),
            },
            BridgeError::Network { kind, message } => BridgeError::Network {
                kind: *kind,
                message: message.clone(),
            },
            BridgeError::ServerNotFound { name } => BridgeError::ServerNotFound { name: name.clone() },
            BridgeError::ServerNotRunning { name } => BridgeError::ServerNotRunning { name: name.clone() },
            BridgeError::DuplicateServerName { name } => BridgeError::DuplicateServerName { name: name.clone() },
            BridgeError::ToolNotFound { name } => BridgeError::ToolNotFound { name: name.clone() },
            BridgeError::Validation { message } => BridgeError::Validation { message: message.clone() },
            BridgeError::Config { message } => BridgeError::Config { message: message.clone() },
            BridgeError::Registry { message } => BridgeError::Registry { message: message.clone() },

            // For non-cloneable types, convert to string representation
            BridgeError::Io(e) => BridgeError::registry(format!("IO error: {}", e)),
            BridgeError::Serde(e) => BridgeError::registry(format!("Serialization error: {}", e)),
            BridgeError::Yaml(e) => BridgeError::registry(format!("YAML error: {}", e)),
            BridgeError::Http(e) => BridgeError::registry(format!("HTTP error: {}", e)),
            BridgeError::Internal(e) => BridgeError::registry(format!("Internal error: {}", e)),
        }
    }
}
