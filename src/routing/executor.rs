//! Request executor
//!
//! Builds an HTTP request from a tool plus runtime arguments and dispatches
//! it. Request construction (`build_request`) is a pure step so URL, header
//! and body assembly are testable without network I/O; `invoke` adds the
//! concurrency bound, the timeout and the outcome mapping. One attempt per
//! invocation, no retries; dropping the returned future aborts the outbound
//! request.

use crate::config::ExecutorConfig;
use crate::error::{BridgeError, NetworkFailure, Result};
use crate::routing::substitution::{substitute_path, value_to_string};
use crate::spec::types::ParameterLocation;
use crate::tools::Tool;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

/// Successful invocation result: upstream status plus decoded payload
///
/// JSON bodies decode into `data`; anything else is carried as raw text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvocationOutcome {
    pub status: u16,
    pub data: Value,
}

/// Executes tool invocations against upstream HTTP APIs
pub struct RequestExecutor {
    client: reqwest::Client,
    timeout: Duration,
    semaphore: Arc<Semaphore>,
}

impl RequestExecutor {
    pub fn new(config: &ExecutorConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_seconds);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            timeout,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_invocations)),
        })
    }

    /// Build the outgoing request without dispatching it
    ///
    /// Validation collects every missing required argument before anything
    /// else happens; unknown argument keys are ignored. Credentials are
    /// injected after caller-supplied values so they win collisions.
    pub fn build_request(&self, tool: &Tool, arguments: &Value) -> Result<reqwest::Request> {
        let empty = serde_json::Map::new();
        let args = arguments.as_object().unwrap_or(&empty);

        let missing: Vec<String> = tool
            .descriptor()
            .parameters
            .iter()
            .filter(|p| p.required && !args.contains_key(&p.name))
            .map(|p| p.name.clone())
            .collect();
        if !missing.is_empty() {
            return Err(BridgeError::missing_arguments(missing));
        }

        let path = substitute_path(tool.path(), args)?;
        let full_url = format!("{}{}", tool.base_url().as_str().trim_end_matches('/'), path);
        let url = Url::parse(&full_url).map_err(|e| {
            BridgeError::validation(format!("invalid request URL '{}': {}", full_url, e))
        })?;

        let mut query: Vec<(String, String)> = Vec::new();
        let mut headers: Vec<(String, String)> = Vec::new();
        let mut body: Option<Value> = None;
        let mut form_fields = serde_json::Map::new();
        for param in &tool.descriptor().parameters {
            let Some(value) = args.get(&param.name) else {
                continue;
            };
            match param.location {
                ParameterLocation::Path => {}
                ParameterLocation::Query => {
                    query.push((param.name.clone(), value_to_string(value)?));
                }
                ParameterLocation::Header => {
                    headers.push((param.name.clone(), value_to_string(value)?));
                }
                ParameterLocation::Body => {
                    body = Some(value.clone());
                }
                ParameterLocation::FormData => {
                    form_fields.insert(param.name.clone(), value.clone());
                }
            }
        }
        if body.is_none() && !form_fields.is_empty() {
            body = Some(Value::Object(form_fields));
        }

        tool.auth().apply(&mut headers, &mut query);

        let mut builder = match tool.method() {
            "GET" => self.client.get(url),
            "POST" => self.client.post(url),
            "PUT" => self.client.put(url),
            "PATCH" => self.client.patch(url),
            "DELETE" => self.client.delete(url),
            "HEAD" => self.client.head(url),
            "OPTIONS" => self.client.request(reqwest::Method::OPTIONS, url),
            "TRACE" => self.client.request(reqwest::Method::TRACE, url),
            other => {
                return Err(BridgeError::validation(format!(
                    "unsupported HTTP method: {}",
                    other
                )));
            }
        };
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        Ok(builder.build()?)
    }

    /// Dispatch one invocation
    pub async fn invoke(&self, tool: &Tool, arguments: &Value) -> Result<InvocationOutcome> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| BridgeError::registry("invocation semaphore closed"))?;

        let request = self.build_request(tool, arguments)?;
        debug!(
            tool = tool.name(),
            method = %request.method(),
            url = %request.url(),
            "dispatching invocation"
        );

        let response = match timeout(self.timeout, self.client.execute(request)).await {
            Err(_) => {
                return Err(BridgeError::network(
                    NetworkFailure::Timeout,
                    format!("no response within {}s", self.timeout.as_secs()),
                ));
            }
            Ok(Err(e)) => return Err(classify_transport_error(e)),
            Ok(Ok(response)) => response,
        };

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            BridgeError::network(
                NetworkFailure::Other,
                format!("failed to read response body: {}", e),
            )
        })?;

        if !status.is_success() {
            warn!(
                tool = tool.name(),
                status = status.as_u16(),
                "upstream returned error status"
            );
            return Err(BridgeError::upstream(status.as_u16(), body));
        }

        let data = if body.is_empty() {
            Value::Null
        } else {
            match serde_json::from_str::<Value>(&body) {
                Ok(parsed) => parsed,
                Err(_) => Value::String(body),
            }
        };

        Ok(InvocationOutcome {
            status: status.as_u16(),
            data,
        })
    }
}

fn classify_transport_error(error: reqwest::Error) -> BridgeError {
    let kind = if error.is_timeout() {
        NetworkFailure::Timeout
    } else if error.is_connect() {
        NetworkFailure::Connect
    } else {
        NetworkFailure::Other
    };
    BridgeError::network(kind, error.to_string())
}
