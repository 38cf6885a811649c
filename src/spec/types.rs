//! Canonical tool descriptor model
//!
//! These types are the dialect-independent output of the normalizer: whatever
//! shape the source document had, every operation ends up as a
//! [`ToolDescriptor`] with the same field semantics.

use crate::auth::AuthKind;
use crate::error::{BridgeError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// HTTP methods a descriptor may carry
pub const SUPPORTED_METHODS: &[&str] = &[
    "GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS", "TRACE",
];

/// Where a parameter is placed in the outgoing request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterLocation {
    #[serde(rename = "path")]
    Path,
    #[serde(rename = "query")]
    Query,
    #[serde(rename = "header")]
    Header,
    #[serde(rename = "body")]
    Body,
    #[serde(rename = "formData")]
    FormData,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Body => "body",
            ParameterLocation::FormData => "formData",
        }
    }
}

/// Declared type of a parameter value
///
/// Anything the source document leaves unresolved falls back to `String`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    #[default]
    String,
    Number,
    Integer,
    Boolean,
    Array,
    File,
}

impl ParameterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterType::String => "string",
            ParameterType::Number => "number",
            ParameterType::Integer => "integer",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
            ParameterType::File => "file",
        }
    }

    /// JSON Schema type name for input-schema generation
    pub fn schema_type(&self) -> &'static str {
        match self {
            ParameterType::String | ParameterType::File => "string",
            ParameterType::Number => "number",
            ParameterType::Integer => "integer",
            ParameterType::Boolean => "boolean",
            ParameterType::Array => "array",
        }
    }
}

/// A single operation parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name
    pub name: String,
    /// Parameter location
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Declared value type
    #[serde(rename = "type", default)]
    pub param_type: ParameterType,
    /// Whether the caller must supply this parameter
    #[serde(default)]
    pub required: bool,
    /// Parameter description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParameterSpec {
    /// Synthesized required string path parameter for an undeclared placeholder
    pub fn synthetic_path(name: &str) -> Self {
        Self {
            name: name.to_string(),
            location: ParameterLocation::Path,
            param_type: ParameterType::String,
            required: true,
            description: None,
        }
    }
}

/// Canonical description of one callable operation
///
/// Immutable after normalization; `validate()` holds on every descriptor the
/// normalizer emits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    /// Unique tool name within its descriptor set
    pub name: String,
    /// HTTP method (uppercase)
    pub method: String,
    /// Path template, possibly containing `{placeholder}` segments
    pub path: String,
    /// Operation parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterSpec>,
    /// JSON Schema of the request body, when the operation has one
    #[serde(rename = "requestBodySchema", default, skip_serializing_if = "Option::is_none")]
    pub request_body_schema: Option<Value>,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Authentication kind this tool expects at construction time
    #[serde(rename = "authRef", default)]
    pub auth_ref: AuthKind,
}

impl ToolDescriptor {
    /// Check structural invariants
    ///
    /// Every `{placeholder}` in the path must map to a required path
    /// parameter, every path parameter must map to a placeholder, and
    /// parameter names must be unique.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(BridgeError::validation("tool name must not be empty"));
        }
        if !SUPPORTED_METHODS.contains(&self.method.as_str()) {
            return Err(BridgeError::validation(format!(
                "tool '{}' has unsupported HTTP method '{}'",
                self.name, self.method
            )));
        }

        let mut seen = HashSet::new();
        for param in &self.parameters {
            if !seen.insert(param.name.as_str()) {
                return Err(BridgeError::validation(format!(
                    "tool '{}' declares parameter '{}' more than once",
                    self.name, param.name
                )));
            }
        }

        let placeholders = path_placeholders(&self.path);
        for placeholder in &placeholders {
            let declared = self.parameters.iter().find(|p| {
                p.location == ParameterLocation::Path && p.name == *placeholder
            });
            match declared {
                Some(p) if p.required => {}
                Some(p) => {
                    return Err(BridgeError::validation(format!(
                        "tool '{}' path parameter '{}' must be required",
                        self.name, p.name
                    )));
                }
                None => {
                    return Err(BridgeError::validation(format!(
                        "tool '{}' path placeholder '{}' has no declared parameter",
                        self.name, placeholder
                    )));
                }
            }
        }
        for param in &self.parameters {
            if param.location == ParameterLocation::Path
                && !placeholders.iter().any(|ph| ph == &param.name)
            {
                return Err(BridgeError::validation(format!(
                    "tool '{}' declares path parameter '{}' with no matching placeholder",
                    self.name, param.name
                )));
            }
        }

        Ok(())
    }

    /// Names of all required parameters
    pub fn required_parameters(&self) -> Vec<&str> {
        self.parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect()
    }
}

/// Severity of a normalization diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
}

/// Non-fatal finding recorded while normalizing a specification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Where in the document the finding applies (path, operation, parameter)
    pub location: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warning<L: Into<String>, M: Into<String>>(location: L, message: M) -> Self {
        Self {
            severity: Severity::Warning,
            location: location.into(),
            message: message.into(),
        }
    }

    pub fn info<L: Into<String>, M: Into<String>>(location: L, message: M) -> Self {
        Self {
            severity: Severity::Info,
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Source dialect of a normalized specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpecDialect {
    #[serde(rename = "swagger2")]
    Swagger2,
    #[serde(rename = "openapi3")]
    OpenApi3,
}

impl SpecDialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecDialect::Swagger2 => "swagger2",
            SpecDialect::OpenApi3 => "openapi3",
        }
    }
}

/// Top-level API metadata carried alongside the descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "baseUrl", default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(rename = "authKind", default)]
    pub auth_kind: AuthKind,
}

/// Result of normalizing one specification document
#[derive(Debug, Clone)]
pub struct NormalizedSpec {
    pub dialect: SpecDialect,
    pub api: ApiInfo,
    pub descriptors: Vec<ToolDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

impl NormalizedSpec {
    /// Convert into the serializable boundary artifact
    pub fn into_set(self) -> DescriptorSet {
        DescriptorSet {
            api: self.api,
            tools: self.descriptors,
        }
    }
}

/// Serializable descriptor-set artifact (YAML or JSON)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorSet {
    pub api: ApiInfo,
    pub tools: Vec<ToolDescriptor>,
}

impl DescriptorSet {
    /// Load a descriptor set from JSON or YAML content, trying JSON first
    pub fn parse(content: &str) -> Result<Self> {
        if let Ok(set) = serde_json::from_str::<DescriptorSet>(content) {
            return Ok(set);
        }
        serde_yaml::from_str::<DescriptorSet>(content).map_err(|e| {
            BridgeError::validation(format!("failed to parse descriptor set: {}", e))
        })
    }
}

/// Intermediate operation shape shared by the two extraction strategies
#[derive(Debug, Clone)]
pub(crate) struct OperationSeed {
    pub method: String,
    pub path: String,
    pub operation_id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub parameters: Vec<ParameterSpec>,
    pub request_body_schema: Option<Value>,
    pub deprecated: bool,
    pub has_responses: bool,
}

/// Collect `{placeholder}` names from a path template in order of appearance
pub fn path_placeholders(path: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut rest = path;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                if !name.is_empty() && !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    names
}
