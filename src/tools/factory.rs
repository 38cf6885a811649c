//! Tool factory
//!
//! Binds a descriptor to an authentication profile and base URL. Construction
//! is pure: everything that can be checked up front is checked here, and no
//! network traffic happens until `invoke`.

use crate::auth::{AuthProfile, ResolvedAuth};
use crate::error::{BridgeError, Result};
use crate::spec::types::ToolDescriptor;
use serde_json::{json, Value};
use url::Url;

/// An invocable operation: descriptor plus resolved credentials and base URL
///
/// Stateless after construction; `Send + Sync` so the registry can hand out
/// `Arc<Tool>` across tasks.
#[derive(Debug, Clone)]
pub struct Tool {
    descriptor: ToolDescriptor,
    base_url: Url,
    auth: ResolvedAuth,
}

impl Tool {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn method(&self) -> &str {
        &self.descriptor.method
    }

    pub fn path(&self) -> &str {
        &self.descriptor.path
    }

    pub fn description(&self) -> Option<&str> {
        self.descriptor.description.as_deref()
    }

    pub fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn auth(&self) -> &ResolvedAuth {
        &self.auth
    }

    /// JSON Schema describing the arguments this tool accepts
    pub fn input_schema(&self) -> Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.descriptor.parameters {
            let mut schema = serde_json::Map::new();
            schema.insert("type".to_string(), json!(param.param_type.schema_type()));
            if let Some(description) = &param.description {
                schema.insert("description".to_string(), json!(description));
            }
            properties.insert(param.name.clone(), Value::Object(schema));
            if param.required {
                required.push(param.name.clone());
            }
        }

        json!({
            "type": "object",
            "properties": properties,
            "required": required
        })
    }
}

/// Builds tools from descriptors
pub struct ToolFactory;

impl ToolFactory {
    /// Build one tool
    ///
    /// Fails with `AuthProfileMismatch` when the profile's kind does not
    /// match the descriptor's expectation or its fields do not fit the kind,
    /// and with `Validation` for a bad base URL or descriptor.
    pub fn build(
        descriptor: ToolDescriptor,
        profile: &AuthProfile,
        base_url: &str,
    ) -> Result<Tool> {
        descriptor.validate()?;

        if profile.kind != descriptor.auth_ref {
            return Err(BridgeError::auth_mismatch(format!(
                "tool '{}' expects auth kind '{}' but profile is '{}'",
                descriptor.name,
                descriptor.auth_ref.as_str(),
                profile.kind.as_str()
            )));
        }

        let base_url = Url::parse(base_url)
            .map_err(|e| BridgeError::validation(format!("invalid base URL '{}': {}", base_url, e)))?;
        let auth = ResolvedAuth::resolve(profile)?;

        Ok(Tool {
            descriptor,
            base_url,
            auth,
        })
    }

    /// Build every descriptor of a set, preserving order
    pub fn build_set(
        descriptors: Vec<ToolDescriptor>,
        profile: &AuthProfile,
        base_url: &str,
    ) -> Result<Vec<Tool>> {
        descriptors
            .into_iter()
            .map(|descriptor| Self::build(descriptor, profile, base_url))
            .collect()
    }
}
