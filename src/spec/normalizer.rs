//! Descriptor normalizer
//!
//! Turns a Swagger 2.0 or OpenAPI 3.0 document into canonical tool
//! descriptors plus diagnostics. Malformed-but-parseable input degrades the
//! output (types default to string, strict checks become diagnostics) rather
//! than failing: the caller decides whether to surface the diagnostics.

use crate::auth::AuthKind;
use crate::error::{BridgeError, Result};
use crate::spec::types::{
    path_placeholders, Diagnostic, NormalizedSpec, OperationSeed, ParameterLocation,
    ParameterSpec, SpecDialect, ToolDescriptor,
};
use crate::spec::{openapi3, swagger2};
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Spec-to-descriptor normalizer
///
/// One instance can normalize any number of documents; options apply to all
/// of them.
pub struct SpecNormalizer {
    method_filter: Option<Vec<String>>,
    include_deprecated: bool,
    auth_kind: AuthKind,
}

impl SpecNormalizer {
    pub fn new() -> Self {
        Self {
            method_filter: None,
            include_deprecated: false,
            auth_kind: AuthKind::None,
        }
    }

    /// Keep only operations with one of the given HTTP methods
    pub fn with_method_filter(mut self, methods: Vec<String>) -> Self {
        self.method_filter = Some(methods.iter().map(|m| m.to_uppercase()).collect());
        self
    }

    /// Emit descriptors for operations marked `deprecated: true`
    pub fn include_deprecated(mut self) -> Self {
        self.include_deprecated = true;
        self
    }

    /// Stamp every emitted descriptor with the authentication kind its tools
    /// will expect at construction time
    pub fn with_auth_kind(mut self, kind: AuthKind) -> Self {
        self.auth_kind = kind;
        self
    }

    /// Normalize one specification document
    pub fn normalize(&self, content: &str) -> Result<NormalizedSpec> {
        let (dialect, document) = detect_dialect(content)?;
        if document.get("paths").is_none() {
            return Err(BridgeError::spec_format(
                "specification has no paths object",
            ));
        }

        let mut diagnostics = Vec::new();
        let (mut api, seeds) = match dialect {
            SpecDialect::Swagger2 => {
                let spec = swagger2::parse(content)?;
                swagger2::extract(&spec, &mut diagnostics)
            }
            SpecDialect::OpenApi3 => {
                let spec = openapi3::parse(content)?;
                openapi3::extract(&spec, &mut diagnostics)
            }
        };
        api.auth_kind = self.auth_kind;

        let mut name_counts: HashMap<String, usize> = HashMap::new();
        let mut descriptors = Vec::new();
        for seed in seeds {
            let op_location = format!("{} {}", seed.method, seed.path);

            if seed.deprecated && !self.include_deprecated {
                diagnostics.push(Diagnostic::info(
                    &op_location,
                    "deprecated operation skipped",
                ));
                continue;
            }
            if let Some(filter) = &self.method_filter {
                if !filter.iter().any(|m| m == &seed.method) {
                    continue;
                }
            }
            if !seed.has_responses {
                diagnostics.push(Diagnostic::warning(
                    &op_location,
                    "operation declares no responses",
                ));
            }

            let name = self.assign_name(&seed, &mut name_counts, &mut diagnostics);
            let descriptor = self.build_descriptor(name, seed, &mut diagnostics);
            match descriptor.validate() {
                Ok(()) => descriptors.push(descriptor),
                Err(e) => diagnostics.push(Diagnostic::warning(
                    &op_location,
                    format!("operation dropped: {}", e),
                )),
            }
        }

        for diagnostic in &diagnostics {
            warn!(
                location = %diagnostic.location,
                "normalization diagnostic: {}",
                diagnostic.message
            );
        }
        debug!(
            dialect = dialect.as_str(),
            tools = descriptors.len(),
            diagnostics = diagnostics.len(),
            "normalized specification"
        );

        Ok(NormalizedSpec {
            dialect,
            api,
            descriptors,
            diagnostics,
        })
    }

    /// Derive the tool name: sanitized `operationId` when present, else
    /// method plus sanitized path; collisions get a numeric suffix in
    /// document order.
    fn assign_name(
        &self,
        seed: &OperationSeed,
        name_counts: &mut HashMap<String, usize>,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> String {
        let base = match &seed.operation_id {
            Some(id) if !id.is_empty() => sanitize_name(id),
            _ => sanitize_name(&format!(
                "{}_{}",
                seed.method.to_lowercase(),
                seed.path.replace('/', "_").replace('{', "").replace('}', "")
            )),
        };

        let count = name_counts.entry(base.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            base
        } else {
            let renamed = format!("{}_{}", base, *count);
            diagnostics.push(Diagnostic::warning(
                format!("{} {}", seed.method, seed.path),
                format!("duplicate tool name '{}'; renamed to '{}'", base, renamed),
            ));
            renamed
        }
    }

    /// Assemble the descriptor and repair its invariants: undeclared
    /// placeholders are synthesized as required string parameters, declared
    /// path parameters are forced required, orphans and duplicates are
    /// dropped.
    fn build_descriptor(
        &self,
        name: String,
        seed: OperationSeed,
        diagnostics: &mut Vec<Diagnostic>,
    ) -> ToolDescriptor {
        let op_location = format!("{} {}", seed.method, seed.path);
        let placeholders = path_placeholders(&seed.path);

        let mut parameters: Vec<ParameterSpec> = Vec::new();
        for param in seed.parameters {
            if parameters.iter().any(|p| p.name == param.name) {
                diagnostics.push(Diagnostic::warning(
                    &op_location,
                    format!("duplicate parameter '{}' dropped", param.name),
                ));
                continue;
            }
            if param.location == ParameterLocation::Path
                && !placeholders.iter().any(|ph| ph == &param.name)
            {
                diagnostics.push(Diagnostic::warning(
                    &op_location,
                    format!(
                        "path parameter '{}' has no matching placeholder and was dropped",
                        param.name
                    ),
                ));
                continue;
            }
            parameters.push(param);
        }

        for placeholder in &placeholders {
            match parameters
                .iter_mut()
                .find(|p| p.location == ParameterLocation::Path && &p.name == placeholder)
            {
                Some(param) => {
                    if !param.required {
                        diagnostics.push(Diagnostic::warning(
                            &op_location,
                            format!("path parameter '{}' forced required", param.name),
                        ));
                        param.required = true;
                    }
                }
                None => {
                    diagnostics.push(Diagnostic::warning(
                        &op_location,
                        format!(
                            "path placeholder '{{{}}}' has no declared parameter; synthesized a required string parameter",
                            placeholder
                        ),
                    ));
                    parameters.push(ParameterSpec::synthetic_path(placeholder));
                }
            }
        }

        if let Some(schema) = &seed.request_body_schema {
            check_body_schema(schema, &op_location, diagnostics);
        }

        let description = seed
            .description
            .or(seed.summary)
            .unwrap_or_else(|| op_location.clone());

        ToolDescriptor {
            name,
            method: seed.method,
            path: seed.path,
            parameters,
            request_body_schema: seed.request_body_schema,
            description: Some(description),
            auth_ref: self.auth_kind,
        }
    }
}

impl Default for SpecNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Detect the dialect from its version marker, trying JSON then YAML
fn detect_dialect(content: &str) -> Result<(SpecDialect, Value)> {
    if let Ok(document) = serde_json::from_str::<Value>(content) {
        return dialect_from_markers(document);
    }
    if let Ok(document) = serde_yaml::from_str::<Value>(content) {
        return dialect_from_markers(document);
    }
    Err(BridgeError::spec_format(
        "content is neither valid JSON nor valid YAML",
    ))
}

fn dialect_from_markers(document: Value) -> Result<(SpecDialect, Value)> {
    if document.get("openapi").is_some() {
        Ok((SpecDialect::OpenApi3, document))
    } else if document.get("swagger").is_some() {
        Ok((SpecDialect::Swagger2, document))
    } else {
        Err(BridgeError::spec_format(
            "document has neither a 'swagger' nor an 'openapi' version marker",
        ))
    }
}

/// Restrict a name to `[A-Za-z0-9_]`
fn sanitize_name(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Request body schemas must compile as JSON Schema; failures degrade to
/// diagnostics so the descriptor still ships.
fn check_body_schema(schema: &Value, location: &str, diagnostics: &mut Vec<Diagnostic>) {
    if let Err(e) = jsonschema::JSONSchema::compile(schema) {
        diagnostics.push(Diagnostic::warning(
            location,
            format!("request body schema does not compile: {}", e),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::types::ParameterType;

    const PETSTORE_V2: &str = r#"
    {
        "swagger": "2.0",
        "info": {"title": "Petstore", "version": "1.0"},
        "host": "petstore.example.com",
        "basePath": "/v2",
        "paths": {
            "/pet/{petId}": {
                "get": {
                    "operationId": "getPetById",
                    "summary": "Find pet by ID",
                    "parameters": [
                        {"name": "petId", "in": "path", "required": true, "type": "integer"}
                    ],
                    "responses": {"200": {"description": "OK"}}
                }
            }
        }
    }
    "#;

    const PETSTORE_V3: &str = r#"
    {
        "openapi": "3.0.0",
        "info": {"title": "Petstore", "version": "1.0"},
        "servers": [{"url": "https://petstore.example.com/v2"}],
        "paths": {
            "/pet/{petId}": {
                "get": {
                    "operationId": "getPetById",
                    "summary": "Find pet by ID",
                    "parameters": [
                        {
                            "name": "petId",
                            "in": "path",
                            "required": true,
                            "schema": {"type": "integer"}
                        }
                    ],
                    "responses": {"200": {"description": "OK"}}
                }
            }
        }
    }
    "#;

    #[test]
    fn test_unrecognizable_content_is_a_spec_format_error() {
        let normalizer = SpecNormalizer::new();
        let result = normalizer.normalize(r#"{"title": "not a spec"}"#);
        assert!(matches!(result, Err(BridgeError::SpecFormat { .. })));
    }

    #[test]
    fn test_missing_paths_is_a_spec_format_error() {
        let normalizer = SpecNormalizer::new();
        let result = normalizer
            .normalize(r#"{"swagger": "2.0", "info": {"title": "x", "version": "1"}}"#);
        assert!(matches!(result, Err(BridgeError::SpecFormat { .. })));
    }

    #[test]
    fn test_dialect_detection() {
        let normalizer = SpecNormalizer::new();
        assert_eq!(
            normalizer.normalize(PETSTORE_V2).unwrap().dialect,
            SpecDialect::Swagger2
        );
        assert_eq!(
            normalizer.normalize(PETSTORE_V3).unwrap().dialect,
            SpecDialect::OpenApi3
        );
    }

    #[test]
    fn test_dialect_independence() {
        let normalizer = SpecNormalizer::new();
        let v2 = normalizer.normalize(PETSTORE_V2).unwrap();
        let v3 = normalizer.normalize(PETSTORE_V3).unwrap();

        assert_eq!(v2.descriptors, v3.descriptors);
        let descriptor = &v2.descriptors[0];
        assert_eq!(descriptor.name, "getPetById");
        assert_eq!(descriptor.method, "GET");
        assert_eq!(descriptor.parameters[0].param_type, ParameterType::Integer);
    }

    #[test]
    fn test_name_falls_back_to_method_and_path() {
        let content = r#"
        {
            "swagger": "2.0",
            "info": {"title": "x", "version": "1"},
            "paths": {
                "/pet/{petId}": {
                    "delete": {
                        "parameters": [
                            {"name": "petId", "in": "path", "required": true, "type": "integer"}
                        ],
                        "responses": {"204": {"description": "Deleted"}}
                    }
                }
            }
        }
        "#;
        let spec = SpecNormalizer::new().normalize(content).unwrap();
        assert_eq!(spec.descriptors[0].name, "delete__pet_petId");
    }

    #[test]
    fn test_name_collisions_get_numeric_suffixes_in_document_order() {
        let content = r#"
        {
            "swagger": "2.0",
            "info": {"title": "x", "version": "1"},
            "paths": {
                "/a": {
                    "get": {"operationId": "fetch", "responses": {"200": {"description": "OK"}}}
                },
                "/b": {
                    "get": {"operationId": "fetch", "responses": {"200": {"description": "OK"}}}
                },
                "/c": {
                    "get": {"operationId": "fetch", "responses": {"200": {"description": "OK"}}}
                }
            }
        }
        "#;
        let spec = SpecNormalizer::new().normalize(content).unwrap();
        let names: Vec<&str> = spec.descriptors.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["fetch", "fetch_2", "fetch_3"]);
        assert!(spec
            .diagnostics
            .iter()
            .any(|d| d.message.contains("duplicate tool name")));
    }

    #[test]
    fn test_undeclared_placeholder_is_synthesized_as_required_string() {
        let content = r#"
        {
            "swagger": "2.0",
            "info": {"title": "x", "version": "1"},
            "paths": {
                "/pet/{petId}": {
                    "get": {
                        "operationId": "getPet",
                        "responses": {"200": {"description": "OK"}}
                    }
                }
            }
        }
        "#;
        let spec = SpecNormalizer::new().normalize(content).unwrap();
        let descriptor = &spec.descriptors[0];
        let param = descriptor
            .parameters
            .iter()
            .find(|p| p.name == "petId")
            .unwrap();
        assert_eq!(param.location, ParameterLocation::Path);
        assert_eq!(param.param_type, ParameterType::String);
        assert!(param.required);
        assert!(spec
            .diagnostics
            .iter()
            .any(|d| d.message.contains("synthesized")));
        descriptor.validate().unwrap();
    }

    #[test]
    fn test_deprecated_operations_are_skipped_unless_included() {
        let content = r#"
        {
            "swagger": "2.0",
            "info": {"title": "x", "version": "1"},
            "paths": {
                "/old": {
                    "get": {
                        "operationId": "oldOp",
                        "deprecated": true,
                        "responses": {"200": {"description": "OK"}}
                    }
                }
            }
        }
        "#;
        let spec = SpecNormalizer::new().normalize(content).unwrap();
        assert!(spec.descriptors.is_empty());

        let spec = SpecNormalizer::new()
            .include_deprecated()
            .normalize(content)
            .unwrap();
        assert_eq!(spec.descriptors.len(), 1);
    }

    #[test]
    fn test_method_filter() {
        let content = r#"
        {
            "swagger": "2.0",
            "info": {"title": "x", "version": "1"},
            "paths": {
                "/pets": {
                    "get": {"operationId": "listPets", "responses": {"200": {"description": "OK"}}},
                    "post": {"operationId": "createPet", "responses": {"201": {"description": "Created"}}}
                }
            }
        }
        "#;
        let spec = SpecNormalizer::new()
            .with_method_filter(vec!["get".to_string()])
            .normalize(content)
            .unwrap();
        assert_eq!(spec.descriptors.len(), 1);
        assert_eq!(spec.descriptors[0].name, "listPets");
    }

    #[test]
    fn test_missing_responses_is_a_diagnostic_not_an_error() {
        let content = r#"
        {
            "swagger": "2.0",
            "info": {"title": "x", "version": "1"},
            "paths": {
                "/pets": {
                    "get": {"operationId": "listPets"}
                }
            }
        }
        "#;
        let spec = SpecNormalizer::new().normalize(content).unwrap();
        assert_eq!(spec.descriptors.len(), 1);
        assert!(spec
            .diagnostics
            .iter()
            .any(|d| d.message.contains("no responses")));
    }

    #[test]
    fn test_auth_kind_is_stamped_on_descriptors() {
        let spec = SpecNormalizer::new()
            .with_auth_kind(AuthKind::ApiKey)
            .normalize(PETSTORE_V2)
            .unwrap();
        assert_eq!(spec.api.auth_kind, AuthKind::ApiKey);
        assert_eq!(spec.descriptors[0].auth_ref, AuthKind::ApiKey);
    }
}
