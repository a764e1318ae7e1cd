//! Check tool call arguments against a tool's JSON Schema before running it.

use std::fmt;

/// First schema rule an argument value broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaViolation {
    NotAnObject { actual: &'static str },
    MissingField(String),
    WrongType {
        field: String,
        expected: String,
        actual: &'static str,
    },
}

impl fmt::Display for SchemaViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAnObject { actual } => write!(f, "expected object arguments, got {actual}"),
            Self::MissingField(name) => write!(f, "missing required field '{name}'"),
            Self::WrongType {
                field,
                expected,
                actual,
            } => write!(f, "field '{field}' expected type '{expected}', got {actual}"),
        }
    }
}

/// Validate arguments against the top level of a JSON Schema.
///
/// Checks the object type, required fields and declared property types.
/// Properties absent from the schema are accepted.
pub fn validate_arguments(
    args: &serde_json::Value,
    schema: &serde_json::Value,
) -> Result<(), SchemaViolation> {
    let wants_object = schema.get("type").and_then(|v| v.as_str()) == Some("object");
    let Some(obj) = args.as_object() else {
        if wants_object {
            return Err(SchemaViolation::NotAnObject {
                actual: json_type_name(args),
            });
        }
        return Ok(());
    };

    let required = schema
        .get("required")
        .and_then(|v| v.as_array())
        .into_iter()
        .flatten()
        .filter_map(|v| v.as_str());
    for name in required {
        if !obj.contains_key(name) {
            return Err(SchemaViolation::MissingField(name.to_string()));
        }
    }

    let Some(properties) = schema.get("properties").and_then(|v| v.as_object()) else {
        return Ok(());
    };
    for (key, value) in obj {
        let expected = properties
            .get(key)
            .and_then(|p| p.get("type"))
            .and_then(|t| t.as_str());
        if let Some(expected) = expected {
            if !value_matches_type(value, expected) {
                return Err(SchemaViolation::WrongType {
                    field: key.clone(),
                    expected: expected.to_string(),
                    actual: json_type_name(value),
                });
            }
        }
    }

    Ok(())
}

fn value_matches_type(value: &serde_json::Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
