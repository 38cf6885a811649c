//! OpenAPI 3.0 extraction strategy
//!
//! Parsing is delegated to the `openapiv3` crate; this module walks the typed
//! model into dialect-independent operation seeds.

use crate::error::{BridgeError, Result};
use crate::spec::types::{
    ApiInfo, Diagnostic, OperationSeed, ParameterLocation, ParameterSpec, ParameterType,
};
use openapiv3::{OpenAPI, Operation, Parameter, PathItem, ReferenceOr};
use serde_json::{json, Value};

/// Parse an OpenAPI 3.0 document from JSON or YAML, trying JSON first
pub(crate) fn parse(content: &str) -> Result<OpenAPI> {
    if let Ok(spec) = serde_json::from_str::<OpenAPI>(content) {
        return Ok(spec);
    }
    serde_yaml::from_str::<OpenAPI>(content).map_err(|e| {
        BridgeError::spec_format(format!("failed to parse OpenAPI 3.0 specification: {}", e))
    })
}

/// Extract API metadata and operation seeds from a parsed document
pub(crate) fn extract(
    spec: &OpenAPI,
    diagnostics: &mut Vec<Diagnostic>,
) -> (ApiInfo, Vec<OperationSeed>) {
    if !spec.openapi.starts_with("3.") {
        diagnostics.push(Diagnostic::warning(
            "openapi",
            format!("unsupported openapi version '{}'", spec.openapi),
        ));
    }
    if spec.info.title.is_empty() {
        diagnostics.push(Diagnostic::warning("info", "document has an empty title"));
    }

    let api = ApiInfo {
        name: if spec.info.title.is_empty() {
            "Unnamed API".to_string()
        } else {
            spec.info.title.clone()
        },
        description: spec.info.description.clone(),
        base_url: spec.servers.first().map(|s| s.url.clone()),
        auth_kind: Default::default(),
    };

    let mut seeds = Vec::new();
    for (path, item_ref) in &spec.paths.paths {
        let Some(path_item) = item_ref.as_item() else {
            diagnostics.push(Diagnostic::warning(
                path,
                "referenced path item cannot be resolved and was skipped",
            ));
            continue;
        };
        for (method, operation) in operations(path_item) {
            seeds.push(convert_operation(path, method, operation, path_item, diagnostics));
        }
    }

    (api, seeds)
}

/// Operations present on a path item, in a fixed method order
fn operations(item: &PathItem) -> Vec<(&'static str, &Operation)> {
    let slots: [(&'static str, &Option<Operation>); 8] = [
        ("GET", &item.get),
        ("POST", &item.post),
        ("PUT", &item.put),
        ("PATCH", &item.patch),
        ("DELETE", &item.delete),
        ("HEAD", &item.head),
        ("OPTIONS", &item.options),
        ("TRACE", &item.trace),
    ];
    let mut ops = Vec::new();
    for (method, slot) in slots {
        if let Some(op) = slot {
            ops.push((method, op));
        }
    }
    ops
}

fn convert_operation(
    path: &str,
    method: &str,
    operation: &Operation,
    path_item: &PathItem,
    diagnostics: &mut Vec<Diagnostic>,
) -> OperationSeed {
    let location = format!("{} {}", method, path);

    let mut parameters = Vec::new();
    for param_ref in path_item.parameters.iter().chain(operation.parameters.iter()) {
        match param_ref.as_item() {
            Some(param) => {
                if let Some(spec) = convert_parameter(param, &location, diagnostics) {
                    // Operation-level declarations replace path-level ones.
                    if let Some(existing) = parameters
                        .iter_mut()
                        .find(|p: &&mut ParameterSpec| p.name == spec.name && p.location == spec.location)
                    {
                        *existing = spec;
                    } else {
                        parameters.push(spec);
                    }
                }
            }
            None => diagnostics.push(Diagnostic::warning(
                &location,
                "referenced parameter cannot be resolved and was skipped",
            )),
        }
    }

    let mut request_body_schema = None;
    if let Some(body_ref) = &operation.request_body {
        match body_ref.as_item() {
            Some(body) => {
                request_body_schema = body_schema(body);
                parameters.push(ParameterSpec {
                    name: "body".to_string(),
                    location: ParameterLocation::Body,
                    param_type: ParameterType::String,
                    required: body.required,
                    description: body.description.clone(),
                });
            }
            None => diagnostics.push(Diagnostic::warning(
                &location,
                "referenced request body cannot be resolved and was skipped",
            )),
        }
    }

    let has_responses =
        operation.responses.default.is_some() || !operation.responses.responses.is_empty();

    OperationSeed {
        method: method.to_string(),
        path: path.to_string(),
        operation_id: operation.operation_id.clone(),
        summary: operation.summary.clone(),
        description: operation.description.clone(),
        parameters,
        request_body_schema,
        deprecated: operation.deprecated,
        has_responses,
    }
}

fn convert_parameter(
    parameter: &Parameter,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<ParameterSpec> {
    let (data, loc) = match parameter {
        Parameter::Path { parameter_data, .. } => (parameter_data, ParameterLocation::Path),
        Parameter::Query { parameter_data, .. } => (parameter_data, ParameterLocation::Query),
        Parameter::Header { parameter_data, .. } => (parameter_data, ParameterLocation::Header),
        Parameter::Cookie { parameter_data, .. } => {
            diagnostics.push(Diagnostic::warning(
                location,
                format!(
                    "cookie parameter '{}' is not supported and was skipped",
                    parameter_data.name
                ),
            ));
            return None;
        }
    };

    Some(ParameterSpec {
        name: data.name.clone(),
        location: loc,
        param_type: parameter_type(&data.format, &data.name, location, diagnostics),
        // Path parameters are always required in OpenAPI 3.0.
        required: data.required || loc == ParameterLocation::Path,
        description: data.description.clone(),
    })
}

fn parameter_type(
    format: &openapiv3::ParameterSchemaOrContent,
    name: &str,
    location: &str,
    diagnostics: &mut Vec<Diagnostic>,
) -> ParameterType {
    use openapiv3::{ParameterSchemaOrContent, SchemaKind, Type, VariantOrUnknownOrEmpty};

    let schema = match format {
        ParameterSchemaOrContent::Schema(schema_ref) => match schema_ref {
            ReferenceOr::Item(schema) => schema,
            ReferenceOr::Reference { .. } => {
                diagnostics.push(Diagnostic::warning(
                    location,
                    format!(
                        "parameter '{}' schema is a reference; defaulting type to string",
                        name
                    ),
                ));
                return ParameterType::String;
            }
        },
        ParameterSchemaOrContent::Content(_) => return ParameterType::String,
    };

    match &schema.schema_kind {
        SchemaKind::Type(Type::String(string_type)) => {
            if matches!(
                &string_type.format,
                VariantOrUnknownOrEmpty::Item(openapiv3::StringFormat::Binary)
            ) {
                ParameterType::File
            } else {
                ParameterType::String
            }
        }
        SchemaKind::Type(Type::Number(_)) => ParameterType::Number,
        SchemaKind::Type(Type::Integer(_)) => ParameterType::Integer,
        SchemaKind::Type(Type::Boolean(_)) => ParameterType::Boolean,
        SchemaKind::Type(Type::Array(_)) => ParameterType::Array,
        _ => {
            diagnostics.push(Diagnostic::warning(
                location,
                format!(
                    "parameter '{}' has unresolvable type; defaulting to string",
                    name
                ),
            ));
            ParameterType::String
        }
    }
}

/// Pick the request body schema: `application/json` wins, else the first
/// media type present
fn body_schema(body: &openapiv3::RequestBody) -> Option<Value> {
    let media = body
        .content
        .get("application/json")
        .or_else(|| body.content.values().next())?;
    match &media.schema {
        Some(ReferenceOr::Item(schema)) => serde_json::to_value(schema).ok(),
        Some(ReferenceOr::Reference { reference }) => Some(json!({ "$ref": reference })),
        None => Some(json!({"type": "object"})),
    }
}
