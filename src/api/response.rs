use serde_json::Value;

use crate::error::ApiError;

/// Turn an error reply into an `ApiError`. This is the only place that looks
/// at error body shapes.
///
/// Precedence: 401, then a non-empty `errors` map, then `message`, `error`,
/// or a bare string body, then `fallback`.
pub fn normalize_error(status: u16, body: &Value, fallback: &str) -> ApiError {
    let message = extract_message(body);

    if status == 401 {
        return ApiError::unauthorized(message.unwrap_or_else(|| fallback.to_string()));
    }

    let field_errors = extract_field_errors(body);
    if !field_errors.is_empty() {
        return ApiError::backend_validation(
            message.unwrap_or_else(|| fallback.to_string()),
            field_errors,
        );
    }

    ApiError::server(status, message.unwrap_or_else(|| fallback.to_string()))
}

/// `message`, then `error`, then the body itself if it is a string
pub fn extract_message(body: &Value) -> Option<String> {
    let candidate = match body {
        Value::String(text) => Some(text.as_str()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| map.get("error").and_then(Value::as_str)),
        _ => None,
    };

    candidate
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// First message per field from an `errors` object, in the order the
/// backend sent them. Values may be a list of strings or a single string.
pub fn extract_field_errors(body: &Value) -> Vec<(String, String)> {
    let Some(errors) = body.get("errors").and_then(Value::as_object) else {
        return Vec::new();
    };

    errors
        .iter()
        .filter_map(|(field, value)| {
            let first = match value {
                Value::Array(items) => items.iter().find_map(Value::as_str),
                Value::String(text) => Some(text.as_str()),
                _ => None,
            }?;
            Some((field.clone(), first.to_string()))
        })
        .collect()
}

/// The record array of a list reply: either the body itself or its `data`
/// member. Anything else is `None`.
pub fn extract_collection(body: &Value) -> Option<&Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(map) => map.get("data").and_then(Value::as_array),
        _ => None,
    }
}
