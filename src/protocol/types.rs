//! Protocol envelope and error codes
//!
//! JSON-RPC 2.0 framing. Standard codes keep their reserved values; bridge
//! conditions occupy the -32000..-31990 implementation-defined range.

use crate::error::BridgeError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric protocol error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // JSON-RPC 2.0 reserved codes
    ParseError,
    InvalidRequest,
    MethodNotFound,
    InvalidParams,
    InternalError,
    // Bridge-specific codes
    ServerNotFound,
    ServerNotRunning,
    ToolNotFound,
    DuplicateServerName,
    UpstreamError,
    NetworkError,
    SpecFormatError,
    AuthError,
    ValidationError,
}

impl ErrorCode {
    pub fn as_i32(&self) -> i32 {
        match self {
            ErrorCode::ParseError => -32700,
            ErrorCode::InvalidRequest => -32600,
            ErrorCode::MethodNotFound => -32601,
            ErrorCode::InvalidParams => -32602,
            ErrorCode::InternalError => -32603,
            ErrorCode::ServerNotFound => -32000,
            ErrorCode::ServerNotRunning => -31999,
            ErrorCode::ToolNotFound => -31998,
            ErrorCode::DuplicateServerName => -31997,
            ErrorCode::UpstreamError => -31996,
            ErrorCode::NetworkError => -31995,
            ErrorCode::SpecFormatError => -31994,
            ErrorCode::AuthError => -31993,
            ErrorCode::ValidationError => -31991,
        }
    }
}

/// A protocol-level error: code plus human message plus optional detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolError {
    pub code: i32,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ProtocolError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_i32(),
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: Value) -> Self {
        Self {
            code: code.as_i32(),
            message: message.into(),
            data: Some(data),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidParams, message)
    }

    pub fn method_not_found(method: &str) -> Self {
        Self::new(
            ErrorCode::MethodNotFound,
            format!("Method not found: {}", method),
        )
    }
}

impl From<BridgeError> for ProtocolError {
    fn from(error: BridgeError) -> Self {
        let message = error.to_string();
        match error {
            BridgeError::MissingArguments { missing } => Self::with_data(
                ErrorCode::InvalidParams,
                message,
                serde_json::json!({ "missing": missing }),
            ),
            BridgeError::PathSubstitution { .. } | BridgeError::Validation { .. } => {
                Self::new(ErrorCode::ValidationError, message)
            }
            BridgeError::SpecFormat { .. } => Self::new(ErrorCode::SpecFormatError, message),
            BridgeError::AuthProfileMismatch { .. } => Self::new(ErrorCode::AuthError, message),
            BridgeError::UpstreamHttp { status, body } => Self::with_data(
                ErrorCode::UpstreamError,
                message,
                serde_json::json!({ "status": status, "body": body }),
            ),
            BridgeError::Network { kind, .. } => Self::with_data(
                ErrorCode::NetworkError,
                message,
                serde_json::json!({ "kind": kind.as_str() }),
            ),
            BridgeError::ServerNotFound { name } => Self::with_data(
                ErrorCode::ServerNotFound,
                message,
                serde_json::json!({ "name": name }),
            ),
            BridgeError::ServerNotRunning { name } => Self::with_data(
                ErrorCode::ServerNotRunning,
                message,
                serde_json::json!({ "name": name }),
            ),
            BridgeError::ToolNotFound { name } => Self::with_data(
                ErrorCode::ToolNotFound,
                message,
                serde_json::json!({ "name": name }),
            ),
            BridgeError::DuplicateServerName { name } => Self::with_data(
                ErrorCode::DuplicateServerName,
                message,
                serde_json::json!({ "name": name }),
            ),
            _ => Self::new(ErrorCode::InternalError, message),
        }
    }
}

/// Incoming request envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeRequest {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

/// Outgoing response envelope
///
/// Exactly one of `result` and `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeResponse {
    pub jsonrpc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProtocolError>,
}

impl BridgeResponse {
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Option<Value>, error: ProtocolError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkFailure;
    use serde_json::json;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ParseError.as_i32(), -32700);
        assert_eq!(ErrorCode::MethodNotFound.as_i32(), -32601);
        assert_eq!(ErrorCode::ServerNotFound.as_i32(), -32000);
        assert_eq!(ErrorCode::ServerNotRunning.as_i32(), -31999);
        assert_eq!(ErrorCode::ToolNotFound.as_i32(), -31998);
        assert_eq!(ErrorCode::ValidationError.as_i32(), -31991);
    }

    #[test]
    fn test_missing_arguments_maps_to_invalid_params_with_names() {
        let error: ProtocolError =
            BridgeError::missing_arguments(vec!["petId".to_string()]).into();
        assert_eq!(error.code, ErrorCode::InvalidParams.as_i32());
        assert_eq!(error.data.unwrap()["missing"][0], "petId");
    }

    #[test]
    fn test_upstream_error_carries_status_and_body() {
        let error: ProtocolError = BridgeError::upstream(404, "not found".to_string()).into();
        assert_eq!(error.code, ErrorCode::UpstreamError.as_i32());
        let data = error.data.unwrap();
        assert_eq!(data["status"], 404);
        assert_eq!(data["body"], "not found");
    }

    #[test]
    fn test_network_error_carries_kind() {
        let error: ProtocolError =
            BridgeError::network(NetworkFailure::Timeout, "no response within 30s").into();
        assert_eq!(error.code, ErrorCode::NetworkError.as_i32());
        assert_eq!(error.data.unwrap()["kind"], "timeout");
    }

    #[test]
    fn test_success_envelope_omits_error_field() {
        let response = BridgeResponse::success(Some(json!(1)), json!({"ok": true}));
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded["jsonrpc"], "2.0");
        assert_eq!(encoded["result"]["ok"], true);
        assert!(encoded.get("error").is_none());
    }

    #[test]
    fn test_error_envelope_omits_result_field() {
        let response = BridgeResponse::error(
            Some(json!("req-1")),
            ProtocolError::method_not_found("servers/dance"),
        );
        let encoded = serde_json::to_value(&response).unwrap();
        assert!(encoded.get("result").is_none());
        assert_eq!(encoded["error"]["code"], -32601);
    }
}
