/// Tools Module
///
/// Each tool lives in its own module exporting a `register` function that adds
/// it to the registry during startup. Argument helpers shared by the tools are
/// defined here.

pub mod add;
pub mod echo;

use serde_json::{Map, Value};

use crate::core::error::ToolError;
use crate::core::registry::ToolRegistry;

/// Register every tool this host serves, in listing order.
pub fn register_all(registry: &mut ToolRegistry) {
    echo::register(registry);
    add::register(registry);
}

/// Fetch a required string argument.
pub(crate) fn required_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "Parameter '{key}' must be a string, got {}",
            json_type(other)
        ))),
        None => Err(missing(key)),
    }
}

/// Fetch a required integer argument.
///
/// Only JSON integers are accepted: `2.0`, `"2"` and `true` are rejected.
pub(crate) fn required_i64(args: &Map<String, Value>, key: &str) -> Result<i64, ToolError> {
    match args.get(key) {
        Some(Value::Number(n)) => n.as_i64().ok_or_else(|| {
            let reason = if n.is_f64() {
                "must be an integer"
            } else {
                "is outside the 64-bit integer range"
            };
            ToolError::InvalidArguments(format!("Parameter '{key}' {reason}, got {n}"))
        }),
        Some(other) => Err(ToolError::InvalidArguments(format!(
            "Parameter '{key}' must be an integer, got {}",
            json_type(other)
        ))),
        None => Err(missing(key)),
    }
}

fn missing(key: &str) -> ToolError {
    ToolError::InvalidArguments(format!("Missing required parameter: {key}"))
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
