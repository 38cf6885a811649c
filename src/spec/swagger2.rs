//! Swagger 2.0 extraction strategy
//!
//! No maintained crate models Swagger 2.0, so the document shape is declared
//! here with serde structs covering the fields the normalizer consumes.

use crate::error::{BridgeError, Result};
use crate::spec::types::{
    ApiInfo, Diagnostic, OperationSeed, ParameterLocation, ParameterSpec, ParameterType,
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;

/// Swagger 2.0 specification root
#[derive(Debug, Clone, Deserialize)]
pub struct Swagger2Spec {
    pub swagger: String,
    pub info: Option<Swagger2Info>,
    pub host: Option<String>,
    #[serde(rename = "basePath")]
    pub base_path: Option<String>,
    pub schemes: Option<Vec<String>>,
    #[serde(default)]
    pub paths: IndexMap<String, Swagger2PathItem>,
}

/// Swagger 2.0 info object
#[derive(Debug, Clone, Deserialize)]
pub struct Swagger2Info {
    pub title: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
}

/// Swagger 2.0 path item
#[derive(Debug, Clone, Deserialize)]
pub struct Swagger2PathItem {
    pub get: Option<Swagger2Operation>,
    pub post: Option<Swagger2Operation>,
    pub put: Option<Swagger2Operation>,
    pub patch: Option<Swagger2Operation>,
    pub delete: Option<Swagger2Operation>,
    pub head: Option<Swagger2Operation>,
    pub options: Option<Swagger2Operation>,
    pub parameters: Option<Vec<Swagger2Parameter>>,
}

impl Swagger2PathItem {
    /// Operations present on this path, in a fixed method order
    fn operations(&self) -> Vec<(&'static str, &Swagger2Operation)> {
        let mut ops = Vec::new();
        let slots: [(&'static str, &Option<Swagger2Operation>); 7] = [
            ("GET", &self.get),
            ("POST", &self.post),
            ("PUT", &self.put),
            ("PATCH", &self.patch),
            ("DELETE", &self.delete),
            ("HEAD", &self.head),
            ("OPTIONS", &self.options),
        ];
        for (method, slot) in slots {
            if let Some(op) = slot {
                ops.push((method, op));
            }
        }
        ops
    }
}

/// Swagger 2.0 operation
#[derive(Debug, Clone, Deserialize)]
pub struct Swagger2Operation {
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    pub parameters: Option<Vec<Swagger2Parameter>>,
    #[serde(default)]
    pub responses: HashMap<String, Value>,
    pub deprecated: Option<bool>,
}

/// Swagger 2.0 parameter
#[derive(Debug, Clone, Deserialize)]
pub struct Swagger2Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    pub description: Option<String>,
    pub required: Option<bool>,
    #[serde(rename = "type")]
    pub param_type: Option<String>,
    pub format: Option<String>,
    pub schema: Option<Value>,
}

/// Parse a Swagger 2.0 document from JSON or YAML, trying JSON first
pub(crate) fn parse(content: &str) -> Result<Swagger2Spec> {
    if let Ok(spec) = serde_json::from_str::<Swagger2Spec>(content) {
        return Ok(spec);
    }
    serde_yaml::from_str::<Swagger2Spec>(content).map_err(|e| {
        BridgeError::spec_format(format!("failed to parse Swagger 2.0 specification: {}", e))
    })
}

/// Extract API metadata and operation seeds from a parsed document
pub(crate) fn extract(
    spec: &Swagger2Spec,
    diagnostics: &mut Vec<Diagnostic>,
) -> (ApiInfo, Vec<OperationSeed>) {
    if spec.swagger != "2.0" {
        diagnostics.push(Diagnostic::warning(
            "swagger",
            format!("unsupported swagger version '{}'", spec.swagger),
        ));
    }

    let api = match &spec.info {
        Some(info) => ApiInfo {
            name: info.title.clone().unwrap_or_else(|| "Unnamed API".to_string()),
            description: info.description.clone(),
            base_url: base_url(spec),
            auth_kind: Default::default(),
        },
        None => {
            diagnostics.push(Diagnostic::warning("info", "document has no info object"));
            ApiInfo {
                name: "Unnamed API".to_string(),
                description: None,
                base_url: base_url(spec),
                auth_kind: Default::default(),
            }
        }
    };

    let mut seeds = Vec::new();
    for (path, path_item) in &spec.paths {
        for (method, operation) in path_item.operations() {
            seeds.push(convert_operation(
                path,
                method,
                operation,
                path_item.parameters.as_deref(),
                diagnostics,
            ));
        }
    }

    (api, seeds)
}

fn base_url(spec: &Swagger2Spec) -> Option<String> {
    let host = spec.host.as_ref()?;
    let scheme = spec
        .schemes
        .as_ref()
        .and_then(|s| s.first().cloned())
        .unwrap_or_else(|| "https".to_string());
    Some(format!(
        "{}://{}{}",
        scheme,
        host,
        spec.base_path.as_deref().unwrap_or("")
    ))
}

fn convert_operation(
    path: &str,
    method: &str,
    operation: &Swagger2Operation,
    path_level_params: Option<&[Swagger2Parameter]>,
    diagnostics: &mut Vec<Diagnostic>,
) -> OperationSeed {
    let location = format!("{} {}", method, path);

    // Operation-level parameters override path-level ones with the same
    // name and location.
    let mut raw: Vec<Swagger2Parameter> = path_level_params.map(|p| p.to_vec()).unwrap_or_default();
    for param in operation.parameters.as_deref().unwrap_or(&[]) {
        if let Some(existing) = raw
            .iter_mut()
            .find(|p| p.name == param.name && p.location == param.location)
        {
            *existing = param.clone();
        } else {
            raw.push(param.clone());
        }
    }

    let mut parameters = Vec::new();
    let mut request_body_schema = None;
    for param in &raw {
        match param.location.as_str() {
            "body" => {
                request_body_schema =
                    Some(param.schema.clone().unwrap_or_else(|| json!({"type": "object"})));
                parameters.push(ParameterSpec {
                    name: param.name.clone(),
                    location: ParameterLocation::Body,
                    param_type: ParameterType::String,
                    required: param.required.unwrap_or(false),
                    description: param.description.clone(),
                });
            }
            other => {
                let loc = match other {
                    "path" => ParameterLocation::Path,
                    "query" => ParameterLocation::Query,
                    "header" => ParameterLocation::Header,
                    "formData" => ParameterLocation::FormData,
                    unknown => {
                        diagnostics.push(Diagnostic::warning(
                            &location,
                            format!(
                                "parameter '{}' has unknown location '{}' and was skipped",
                                param.name, unknown
                            ),
                        ));
                        continue;
                    }
                };
                parameters.push(ParameterSpec {
                    name: param.name.clone(),
                    location: loc,
                    param_type: convert_type(param, &location, diagnostics),
                    required: param.required.unwrap_or(false),
                    description: param.description.clone(),
                });
            }
        }
    }

    OperationSeed {
        method: method.to_string(),
        path: path.to_string(),
        operation_id: operation.operation_id.clone(),
        summary: operation.summary.clone(),
        description: operation.description.clone(),
        parameters,
        request_body_schema,
        deprecated: operation.deprecated.unwrap_or(false),
        has_responses: !operation.responses.is_empty(),
    }
}

fn convert_type(
    param: &Swagger2Parameter,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> ParameterType {
    match param.param_type.as_deref() {
        Some("string") => {
            if param.format.as_deref() == Some("binary") {
                ParameterType::File
            } else {
                ParameterType::String
            }
        }
        Some("number") => ParameterType::Number,
        Some("integer") => ParameterType::Integer,
        Some("boolean") => ParameterType::Boolean,
        Some("array") => ParameterType::Array,
        Some("file") => ParameterType::File,
        Some(unknown) => {
            diagnostics.push(Diagnostic::warning(
                location,
                format!(
                    "parameter '{}' has unresolvable type '{}'; defaulting to string",
                    param.name, unknown
                ),
            ));
            ParameterType::String
        }
        None => ParameterType::String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse("{not json or yaml").is_err());
    }

    #[test]
    fn test_body_parameter_becomes_request_body_schema() {
        let spec_content = r#"
        {
            "swagger": "2.0",
            "info": {"title": "Pets", "version": "1.0"},
            "paths": {
                "/pets": {
                    "post": {
                        "operationId": "createPet",
                        "parameters": [
                            {
                                "name": "pet",
                                "in": "body",
                                "required": true,
                                "schema": {"type": "object", "properties": {"name": {"type": "string"}}}
                            }
                        ],
                        "responses": {"201": {"description": "Created"}}
                    }
                }
            }
        }
        "#;
        let spec = parse(spec_content).unwrap();
        let mut diagnostics = Vec::new();
        let (api, seeds) = extract(&spec, &mut diagnostics);

        assert_eq!(api.name, "Pets");
        assert_eq!(seeds.len(), 1);
        let seed = &seeds[0];
        assert!(seed.request_body_schema.is_some());
        assert_eq!(seed.parameters.len(), 1);
        assert_eq!(seed.parameters[0].location, ParameterLocation::Body);
        assert!(seed.parameters[0].required);
    }

    #[test]
    fn test_unknown_type_defaults_to_string_with_diagnostic() {
        let spec_content = r#"
        swagger: "2.0"
        info:
          title: Odd
          version: "1.0"
        paths:
          /things:
            get:
              parameters:
                - name: weird
                  in: query
                  type: quaternion
              responses:
                "200":
                  description: OK
        "#;
        let spec = parse(spec_content).unwrap();
        let mut diagnostics = Vec::new();
        let (_, seeds) = extract(&spec, &mut diagnostics);

        assert_eq!(seeds[0].parameters[0].param_type, ParameterType::String);
        assert!(diagnostics.iter().any(|d| d.message.contains("quaternion")));
    }

    #[test]
    fn test_base_url_from_host_and_base_path() {
        let spec_content = r#"
        {
            "swagger": "2.0",
            "info": {"title": "Pets", "version": "1.0"},
            "host": "petstore.example.com",
            "basePath": "/v2",
            "schemes": ["https"],
            "paths": {}
        }
        "#;
        let spec = parse(spec_content).unwrap();
        let mut diagnostics = Vec::new();
        let (api, _) = extract(&spec, &mut diagnostics);
        assert_eq!(api.base_url.as_deref(), Some("https://petstore.example.com/v2"));
    }
}
