//! Full protocol flow: create a server from a raw specification, then call
//! a tool through the JSON-RPC surface against a mock upstream

use restbridge::config::BridgeConfig;
use restbridge::protocol::{BridgeRequest, ProtocolHandler};
use restbridge::registry::ServerRegistry;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const WEATHER_V3: &str = r#"{
    "openapi": "3.0.0",
    "info": { "title": "Weather", "version": "2.1.0" },
    "paths": {
        "/forecast/{city}": {
            "get": {
                "operationId": "getForecast",
                "parameters": [
                    { "name": "city", "in": "path", "required": true,
                      "schema": { "type": "string" } }
                ],
                "responses": { "200": { "description": "ok" } }
            }
        }
    }
}"#;

fn handler() -> ProtocolHandler {
    ProtocolHandler::new(Arc::new(
        ServerRegistry::new(&BridgeConfig::default()).unwrap(),
    ))
}

async fn send(handler: &ProtocolHandler, method: &str, params: Value) -> Value {
    let response = handler
        .handle_request(BridgeRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(1)),
            method: method.to_string(),
            params: Some(params),
        })
        .await;
    match response.result {
        Some(result) => result,
        None => panic!("request failed: {:?}", response.error),
    }
}

#[tokio::test]
async fn test_create_start_call_over_the_protocol() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/oslo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"high": 21, "low": 12})))
        .mount(&upstream)
        .await;

    let handler = handler();
    let created = send(
        &handler,
        "servers/create",
        json!({ "name": "weather", "spec": WEATHER_V3, "baseUrl": upstream.uri() }),
    )
    .await;
    assert_eq!(created["dialect"], "openapi3");
    assert_eq!(created["toolCount"], 1);

    send(&handler, "servers/start", json!({ "name": "weather" })).await;

    let outcome = send(
        &handler,
        "tools/call",
        json!({ "server": "weather", "tool": "getForecast", "arguments": { "city": "oslo" } }),
    )
    .await;
    assert_eq!(outcome["status"], 200);
    assert_eq!(outcome["data"]["high"], 21);

    let listed = send(&handler, "servers/list", json!({})).await;
    assert_eq!(listed["servers"][0]["name"], "weather");
    assert_eq!(listed["servers"][0]["running"], true);
}

#[tokio::test]
async fn test_upstream_failure_maps_to_protocol_error_with_detail() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast/nowhere"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&upstream)
        .await;

    let handler = handler();
    send(
        &handler,
        "servers/create",
        json!({ "name": "weather", "spec": WEATHER_V3, "baseUrl": upstream.uri() }),
    )
    .await;
    send(&handler, "servers/start", json!({ "name": "weather" })).await;

    let response = handler
        .handle_request(BridgeRequest {
            jsonrpc: "2.0".to_string(),
            id: Some(json!(2)),
            method: "tools/call".to_string(),
            params: Some(
                json!({ "server": "weather", "tool": "getForecast", "arguments": { "city": "nowhere" } }),
            ),
        })
        .await;

    let error = response.error.unwrap();
    assert_eq!(error.code, -31996);
    let data = error.data.unwrap();
    assert_eq!(data["status"], 502);
    assert_eq!(data["body"], "bad gateway");
}
