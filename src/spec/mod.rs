//! Specification normalization
//!
//! Takes Swagger 2.0 / OpenAPI 3.0 documents and produces canonical tool
//! descriptors plus non-fatal diagnostics.

mod normalizer;
mod openapi3;
mod swagger2;
pub mod types;

pub use normalizer::SpecNormalizer;
pub use types::{
    path_placeholders, ApiInfo, DescriptorSet, Diagnostic, NormalizedSpec, ParameterLocation,
    ParameterSpec, ParameterType, Severity, SpecDialect, ToolDescriptor,
};
