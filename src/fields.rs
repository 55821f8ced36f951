//! Field coercion for heterogeneous wire input.
//!
//! Mutation payloads arrive either as declared-typed JSON values or as
//! string-typed multipart form fields. Every coercer here accepts both
//! encodings for its declared kind, maps the multipart "empty string" and
//! JSON null/absent sentinels to "no value supplied", and rejects anything
//! else with a [`FieldError`] naming the field, the offending value, and the
//! expected shape. Callers collect errors across all fields so one request
//! surfaces every problem at once.

use serde_json::Value;

use crate::error::FieldError;

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s),
        other => other.to_string(),
    }
}

/// Coerce a boolean field. Accepts native `true`/`false` and the strings
/// `"true"`/`"false"` (case-sensitive). `Ok(None)` means the caller sent
/// nothing meaningful; it must not be read as `false`.
pub fn coerce_bool(field: &str, value: Option<&Value>) -> Result<Option<bool>, FieldError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) if s == "true" => Ok(Some(true)),
        Some(Value::String(s)) if s == "false" => Ok(Some(false)),
        Some(other) => Err(FieldError::new(
            field,
            render(other),
            "boolean or \"true\"/\"false\"",
        )),
    }
}

/// Coerce an integer field with a lower domain bound.
pub fn coerce_int(
    field: &str,
    value: Option<&Value>,
    min: i64,
) -> Result<Option<i64>, FieldError> {
    let expected = move || format!("integer >= {}", min);
    let n = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::String(s)) if s.is_empty() => return Ok(None),
        Some(Value::Number(n)) => n
            .as_i64()
            .ok_or_else(|| FieldError::new(field, n, expected()))?,
        Some(Value::String(s)) => s
            .parse::<i64>()
            .map_err(|_| FieldError::new(field, format!("\"{}\"", s), expected()))?,
        Some(other) => return Err(FieldError::new(field, render(other), expected())),
    };
    if n < min {
        return Err(FieldError::new(field, n, expected()));
    }
    Ok(Some(n))
}

/// Coerce a free-text field. Empty strings count as "no value supplied".
pub fn coerce_text(field: &str, value: Option<&Value>) -> Result<Option<String>, FieldError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(FieldError::new(field, render(other), "string")),
    }
}

/// Coerce an enumerated field; the error names the full allowed set.
pub fn coerce_enum(
    field: &str,
    value: Option<&Value>,
    allowed: &'static [&'static str],
) -> Result<Option<String>, FieldError> {
    let expected = move || format!("one of {}", allowed.join(", "));
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) if allowed.contains(&s.as_str()) => Ok(Some(s.clone())),
        Some(other) => Err(FieldError::new(field, render(other), expected())),
    }
}

/// Coerce an ordered string-array field. Only a native array of strings is
/// accepted; mixed-type arrays and scalar values are rejected.
pub fn coerce_string_list(
    field: &str,
    value: Option<&Value>,
) -> Result<Option<Vec<String>>, FieldError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    other => {
                        return Err(FieldError::new(
                            field,
                            render(other),
                            "array of strings",
                        ))
                    }
                }
            }
            Ok(Some(out))
        }
        Some(other) => Err(FieldError::new(field, render(other), "array of strings")),
    }
}

/// Serialize a features list for the TEXT column. Paired with
/// [`decode_features`]; the round-trip is exact for any ordered list of
/// strings, including the empty one.
pub fn encode_features(features: &[String]) -> String {
    serde_json::to_string(features).unwrap_or_else(|_| "[]".to_string())
}

/// Deserialize a stored features column. Corrupt or legacy-null content
/// decodes to an empty list rather than failing the read.
pub fn decode_features(stored: &str) -> Vec<String> {
    serde_json::from_str(stored).unwrap_or_default()
}
