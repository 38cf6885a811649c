//! Server registry
//!
//! Owns named tool-server instances behind an `RwLock`ed ordered map.
//! Structural operations (create/remove) take the write lock; lookups clone
//! the `Arc` and release the lock before dispatching, so invocations on
//! distinct tools proceed concurrently.

use crate::auth::AuthProfile;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use crate::routing::{InvocationOutcome, RequestExecutor};
use crate::spec::types::ToolDescriptor;
use crate::tools::{Tool, ToolFactory};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// A named collection of tools bound to one upstream API
pub struct ToolServer {
    name: String,
    base_url: String,
    tools: IndexMap<String, Arc<Tool>>,
    running: AtomicBool,
}

impl ToolServer {
    fn new(name: String, base_url: String, tools: Vec<Tool>) -> Self {
        let tools = tools
            .into_iter()
            .map(|tool| (tool.name().to_string(), Arc::new(tool)))
            .collect();
        Self {
            name,
            base_url,
            tools,
            running: AtomicBool::new(false),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns true if the server transitioned from stopped to running
    fn start(&self) -> bool {
        !self.running.swap(true, Ordering::SeqCst)
    }

    /// Returns true if the server transitioned from running to stopped
    fn stop(&self) -> bool {
        self.running.swap(false, Ordering::SeqCst)
    }

    pub fn tool(&self, name: &str) -> Option<Arc<Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn tool_count(&self) -> usize {
        self.tools.len()
    }

    fn status(&self) -> ServerStatus {
        ServerStatus {
            name: self.name.clone(),
            base_url: self.base_url.clone(),
            running: self.is_running(),
            tool_count: self.tool_count(),
        }
    }

    fn tool_summaries(&self) -> Vec<ToolSummary> {
        self.tools
            .values()
            .map(|tool| ToolSummary {
                name: tool.name().to_string(),
                method: tool.method().to_string(),
                path: tool.path().to_string(),
                description: tool.description().map(str::to_string),
                input_schema: tool.input_schema(),
            })
            .collect()
    }
}

/// One row of `list_servers`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerStatus {
    pub name: String,
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    pub running: bool,
    #[serde(rename = "toolCount")]
    pub tool_count: usize,
}

/// One row of `list_tools`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSummary {
    pub name: String,
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Registry of named tool servers
///
/// An explicit object: callers construct as many registries as they need,
/// there is no global instance.
pub struct ServerRegistry {
    servers: RwLock<IndexMap<String, Arc<ToolServer>>>,
    executor: Arc<RequestExecutor>,
}

impl ServerRegistry {
    pub fn new(config: &BridgeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            servers: RwLock::new(IndexMap::new()),
            executor: Arc::new(RequestExecutor::new(&config.executor)?),
        })
    }

    /// Register a new server from descriptors, building every tool up front
    ///
    /// The new server starts in the stopped state.
    pub async fn create_server(
        &self,
        name: &str,
        descriptors: Vec<ToolDescriptor>,
        profile: &AuthProfile,
        base_url: &str,
    ) -> Result<()> {
        if name.is_empty() {
            return Err(BridgeError::validation("server name must not be empty"));
        }

        let mut servers = self.servers.write().await;
        if servers.contains_key(name) {
            return Err(BridgeError::duplicate_server(name));
        }

        let tools = ToolFactory::build_set(descriptors, profile, base_url)?;
        info!(server = name, tools = tools.len(), "registered tool server");
        servers.insert(
            name.to_string(),
            Arc::new(ToolServer::new(name.to_string(), base_url.to_string(), tools)),
        );
        Ok(())
    }

    /// Mark a server running; starting a running server is a no-op success
    pub async fn start_server(&self, name: &str) -> Result<()> {
        let server = self.get(name).await?;
        if server.start() {
            info!(server = name, "server started");
        } else {
            debug!(server = name, "server already running");
        }
        Ok(())
    }

    /// Mark a server stopped; stopping a stopped server is a no-op success
    pub async fn stop_server(&self, name: &str) -> Result<()> {
        let server = self.get(name).await?;
        if server.stop() {
            info!(server = name, "server stopped");
        } else {
            debug!(server = name, "server already stopped");
        }
        Ok(())
    }

    /// Drop a server from the registry regardless of its state
    pub async fn remove_server(&self, name: &str) -> Result<()> {
        let mut servers = self.servers.write().await;
        servers
            .shift_remove(name)
            .ok_or_else(|| BridgeError::server_not_found(name))?;
        info!(server = name, "server removed");
        Ok(())
    }

    /// Statuses of all registered servers, in registration order
    pub async fn list_servers(&self) -> Vec<ServerStatus> {
        let servers = self.servers.read().await;
        servers.values().map(|s| s.status()).collect()
    }

    /// Tool summaries of one server, in descriptor order
    pub async fn list_tools(&self, name: &str) -> Result<Vec<ToolSummary>> {
        let server = self.get(name).await?;
        Ok(server.tool_summaries())
    }

    /// Invoke a tool on a running server
    ///
    /// The registry lock is released before dispatch.
    pub async fn invoke(
        &self,
        server_name: &str,
        tool_name: &str,
        arguments: &Value,
    ) -> Result<InvocationOutcome> {
        let server = self.get(server_name).await?;
        if !server.is_running() {
            return Err(BridgeError::server_not_running(server_name));
        }
        let tool = server
            .tool(tool_name)
            .ok_or_else(|| BridgeError::tool_not_found(tool_name))?;
        self.executor.invoke(&tool, arguments).await
    }

    async fn get(&self, name: &str) -> Result<Arc<ToolServer>> {
        let servers = self.servers.read().await;
        servers
            .get(name)
            .cloned()
            .ok_or_else(|| BridgeError::server_not_found(name))
    }
}
