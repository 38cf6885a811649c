//! Path template substitution

use crate::error::{BridgeError, Result};
use crate::spec::types::path_placeholders;
use serde_json::Value;

/// Replace every `{placeholder}` in a path template with the percent-encoded
/// argument value
///
/// Required-argument validation runs before this, so a miss here means the
/// template and the descriptor disagree.
pub fn substitute_path(template: &str, arguments: &serde_json::Map<String, Value>) -> Result<String> {
    let mut result = template.to_string();
    for name in path_placeholders(template) {
        let value = arguments.get(&name).ok_or_else(|| {
            BridgeError::path_substitution(format!(
                "no value for path placeholder '{{{}}}' in '{}'",
                name, template
            ))
        })?;
        let replacement = urlencoding::encode(&value_to_string(value)?).into_owned();
        result = result.replace(&format!("{{{}}}", name), &replacement);
    }
    Ok(result)
}

/// Convert a JSON value to the string placed into a URL or header
pub fn value_to_string(value: &Value) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_string()),
        Value::Array(_) | Value::Object(_) => {
            // Complex values serialize to their JSON text
            serde_json::to_string(value).map_err(|e| {
                BridgeError::validation(format!("failed to serialize parameter value: {}", e))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> serde_json::Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_basic_substitution() {
        let result = substitute_path("/pets/{petId}", &args(json!({"petId": 42}))).unwrap();
        assert_eq!(result, "/pets/42");
    }

    #[test]
    fn test_multiple_placeholders() {
        let result = substitute_path(
            "/stores/{storeId}/orders/{orderId}",
            &args(json!({"storeId": "east", "orderId": 7})),
        )
        .unwrap();
        assert_eq!(result, "/stores/east/orders/7");
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let result = substitute_path(
            "/files/{name}",
            &args(json!({"name": "weekly report.pdf"})),
        )
        .unwrap();
        assert_eq!(result, "/files/weekly%20report.pdf");

        let result = substitute_path("/tags/{tag}", &args(json!({"tag": "a/b"}))).unwrap();
        assert_eq!(result, "/tags/a%2Fb");
    }

    #[test]
    fn test_missing_value_is_a_substitution_error() {
        let err = substitute_path("/pets/{petId}", &args(json!({}))).unwrap_err();
        assert!(matches!(err, BridgeError::PathSubstitution { .. }));
        assert!(err.to_string().contains("petId"));
    }

    #[test]
    fn test_boolean_and_null_values() {
        assert_eq!(value_to_string(&json!(true)).unwrap(), "true");
        assert_eq!(value_to_string(&Value::Null).unwrap(), "null");
    }
}
