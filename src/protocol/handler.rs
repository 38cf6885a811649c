//! Protocol handler
//!
//! Dispatches request envelopes by method string onto the registry. Every
//! path produces a response; errors never escape as panics or bare `Err`s.

use crate::auth::AuthProfile;
use crate::protocol::types::{BridgeRequest, BridgeResponse, ProtocolError};
use crate::registry::ServerRegistry;
use crate::spec::SpecNormalizer;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct CreateParams {
    name: String,
    spec: String,
    #[serde(default)]
    auth: Option<AuthProfile>,
    #[serde(rename = "baseUrl", default)]
    base_url: Option<String>,
    #[serde(rename = "includeDeprecated", default)]
    include_deprecated: bool,
    #[serde(default)]
    methods: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ServerParams {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ListToolsParams {
    server: String,
}

#[derive(Debug, Deserialize)]
struct CallParams {
    server: String,
    tool: String,
    #[serde(default)]
    arguments: Value,
}

/// Handles bridge protocol requests against one registry
pub struct ProtocolHandler {
    registry: Arc<ServerRegistry>,
}

impl ProtocolHandler {
    pub fn new(registry: Arc<ServerRegistry>) -> Self {
        Self { registry }
    }

    /// Decode one raw message and answer it
    ///
    /// A body that is not valid JSON gets a ParseError response with a null
    /// id, since no id could be recovered.
    pub async fn handle_message(&self, raw: &str) -> BridgeResponse {
        let request: BridgeRequest = match serde_json::from_str(raw) {
            Ok(request) => request,
            Err(e) => {
                return BridgeResponse::error(
                    None,
                    ProtocolError::new(
                        crate::protocol::types::ErrorCode::ParseError,
                        format!("Parse error: {}", e),
                    ),
                );
            }
        };
        self.handle_request(request).await
    }

    /// Dispatch one decoded request
    pub async fn handle_request(&self, request: BridgeRequest) -> BridgeResponse {
        let id = request.id.clone();
        if request.jsonrpc != "2.0" {
            return BridgeResponse::error(
                id,
                ProtocolError::invalid_request(format!(
                    "unsupported protocol version '{}'",
                    request.jsonrpc
                )),
            );
        }

        debug!(method = %request.method, "handling request");
        let params = request.params.unwrap_or(Value::Null);
        let result = match request.method.as_str() {
            "servers/create" => self.create_server(params).await,
            "servers/start" => self.start_server(params).await,
            "servers/stop" => self.stop_server(params).await,
            "servers/remove" => self.remove_server(params).await,
            "servers/list" => self.list_servers().await,
            "tools/list" => self.list_tools(params).await,
            "tools/call" => self.call_tool(params).await,
            other => {
                return BridgeResponse::error(id, ProtocolError::method_not_found(other));
            }
        };

        match result {
            Ok(value) => BridgeResponse::success(id, value),
            Err(error) => BridgeResponse::error(id, error),
        }
    }

    async fn create_server(&self, params: Value) -> std::result::Result<Value, ProtocolError> {
        let params: CreateParams = decode_params(params)?;
        let profile = params.auth.unwrap_or_else(AuthProfile::none);

        let mut normalizer = SpecNormalizer::new().with_auth_kind(profile.kind);
        if params.include_deprecated {
            normalizer = normalizer.include_deprecated();
        }
        if let Some(methods) = params.methods {
            normalizer = normalizer.with_method_filter(methods);
        }

        let normalized = normalizer.normalize(&params.spec)?;
        let base_url = params
            .base_url
            .or_else(|| normalized.api.base_url.clone())
            .ok_or_else(|| {
                ProtocolError::invalid_params(
                    "no base URL: the specification declares none and baseUrl was not given",
                )
            })?;

        self.registry
            .create_server(&params.name, normalized.descriptors.clone(), &profile, &base_url)
            .await?;
        info!(server = %params.name, dialect = normalized.dialect.as_str(), "server created");

        Ok(json!({
            "name": params.name,
            "baseUrl": base_url,
            "dialect": normalized.dialect.as_str(),
            "toolCount": normalized.descriptors.len(),
            "diagnostics": normalized.diagnostics,
        }))
    }

    async fn start_server(&self, params: Value) -> std::result::Result<Value, ProtocolError> {
        let params: ServerParams = decode_params(params)?;
        self.registry.start_server(&params.name).await?;
        Ok(json!({ "name": params.name, "running": true }))
    }

    async fn stop_server(&self, params: Value) -> std::result::Result<Value, ProtocolError> {
        let params: ServerParams = decode_params(params)?;
        self.registry.stop_server(&params.name).await?;
        Ok(json!({ "name": params.name, "running": false }))
    }

    async fn remove_server(&self, params: Value) -> std::result::Result<Value, ProtocolError> {
        let params: ServerParams = decode_params(params)?;
        self.registry.remove_server(&params.name).await?;
        Ok(json!({ "name": params.name, "removed": true }))
    }

    async fn list_servers(&self) -> std::result::Result<Value, ProtocolError> {
        let servers = self.registry.list_servers().await;
        Ok(json!({ "servers": servers }))
    }

    async fn list_tools(&self, params: Value) -> std::result::Result<Value, ProtocolError> {
        let params: ListToolsParams = decode_params(params)?;
        let tools = self.registry.list_tools(&params.server).await?;
        Ok(json!({ "tools": tools }))
    }

    async fn call_tool(&self, params: Value) -> std::result::Result<Value, ProtocolError> {
        let params: CallParams = decode_params(params)?;
        let arguments = if params.arguments.is_null() {
            json!({})
        } else {
            params.arguments
        };
        let outcome = self
            .registry
            .invoke(&params.server, &params.tool, &arguments)
            .await?;
        serde_json::to_value(outcome).map_err(|e| {
            ProtocolError::new(
                crate::protocol::types::ErrorCode::InternalError,
                format!("failed to encode outcome: {}", e),
            )
        })
    }
}

fn decode_params<T: serde::de::DeserializeOwned>(
    params: Value,
) -> std::result::Result<T, ProtocolError> {
    serde_json::from_value(params)
        .map_err(|e| ProtocolError::invalid_params(format!("Invalid params: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BridgeConfig;
    use crate::protocol::types::ErrorCode;

    const PETSTORE_V2: &str = r#"{
        "swagger": "2.0",
        "info": { "title": "Petstore", "version": "1.0.0" },
        "host": "petstore.example.com",
        "basePath": "/v2",
        "schemes": ["https"],
        "paths": {
            "/pet/{petId}": {
                "get": {
                    "operationId": "getPetById",
                    "parameters": [
                        { "name": "petId", "in": "path", "required": true, "type": "integer" }
                    ],
                    "responses": { "200": { "description": "ok" } }
                }
            }
        }
    }"#;

    fn handler() -> ProtocolHandler {
        let registry = ServerRegistry::new(&BridgeConfig::default()).unwrap();
        ProtocolHandler::new(Arc::new(registry))
    }

    fn request(method: &str, params: Value) -> BridgeRequest {
        BridgeRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params: Some(params),
        }
    }

    async fn create_petstore(handler: &ProtocolHandler) -> BridgeResponse {
        handler
            .handle_request(request(
                "servers/create",
                json!({ "name": "petstore", "spec": PETSTORE_V2 }),
            ))
            .await
    }

    #[tokio::test]
    async fn test_create_reports_dialect_and_tool_count() {
        let handler = handler();
        let response = create_petstore(&handler).await;
        let result = response.result.unwrap();
        assert_eq!(result["dialect"], "swagger2");
        assert_eq!(result["toolCount"], 1);
        assert_eq!(result["baseUrl"], "https://petstore.example.com/v2");
    }

    #[tokio::test]
    async fn test_full_lifecycle_over_the_protocol() {
        let handler = handler();
        create_petstore(&handler).await;

        let response = handler
            .handle_request(request("servers/start", json!({ "name": "petstore" })))
            .await;
        assert_eq!(response.result.unwrap()["running"], true);

        let response = handler
            .handle_request(request("tools/list", json!({ "server": "petstore" })))
            .await;
        let tools = response.result.unwrap();
        assert_eq!(tools["tools"][0]["name"], "getPetById");

        let response = handler
            .handle_request(request("servers/stop", json!({ "name": "petstore" })))
            .await;
        assert_eq!(response.result.unwrap()["running"], false);

        let response = handler
            .handle_request(request("servers/remove", json!({ "name": "petstore" })))
            .await;
        assert_eq!(response.result.unwrap()["removed"], true);

        let response = handler.handle_request(request("servers/list", json!({}))).await;
        assert_eq!(response.result.unwrap()["servers"], json!([]));
    }

    #[tokio::test]
    async fn test_unknown_method_yields_method_not_found() {
        let handler = handler();
        let response = handler
            .handle_request(request("servers/dance", json!({})))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::MethodNotFound.as_i32());
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version_is_rejected() {
        let handler = handler();
        let mut bad = request("servers/list", json!({}));
        bad.jsonrpc = "1.0".to_string();
        let response = handler.handle_request(bad).await;
        assert_eq!(
            response.error.unwrap().code,
            ErrorCode::InvalidRequest.as_i32()
        );
    }

    #[tokio::test]
    async fn test_malformed_message_yields_parse_error() {
        let handler = handler();
        let response = handler.handle_message("{not json").await;
        assert_eq!(response.error.unwrap().code, ErrorCode::ParseError.as_i32());
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_call_on_stopped_server_maps_to_server_not_running() {
        let handler = handler();
        create_petstore(&handler).await;

        let response = handler
            .handle_request(request(
                "tools/call",
                json!({ "server": "petstore", "tool": "getPetById", "arguments": { "petId": 1 } }),
            ))
            .await;
        assert_eq!(
            response.error.unwrap().code,
            ErrorCode::ServerNotRunning.as_i32()
        );
    }

    #[tokio::test]
    async fn test_call_with_missing_argument_maps_to_invalid_params() {
        let handler = handler();
        create_petstore(&handler).await;
        handler
            .handle_request(request("servers/start", json!({ "name": "petstore" })))
            .await;

        let response = handler
            .handle_request(request(
                "tools/call",
                json!({ "server": "petstore", "tool": "getPetById" }),
            ))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, ErrorCode::InvalidParams.as_i32());
        assert_eq!(error.data.unwrap()["missing"][0], "petId");
    }

    #[tokio::test]
    async fn test_create_without_any_base_url_is_invalid_params() {
        let handler = handler();
        let spec = r#"{"openapi": "3.0.0", "info": {"title": "Bare", "version": "1"}, "paths": {}}"#;
        let response = handler
            .handle_request(request(
                "servers/create",
                json!({ "name": "bare", "spec": spec }),
            ))
            .await;
        assert_eq!(
            response.error.unwrap().code,
            ErrorCode::InvalidParams.as_i32()
        );
    }
}
