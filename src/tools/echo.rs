/// Echo Tool Implementation
///
/// Returns the `message` argument prefixed with `"Echo: "`.

use serde_json::{Map, Value, json};

use crate::core::error::ToolError;
use crate::core::registry::{MCPTool, ToolHandler, ToolRegistry};
use crate::tools::required_str;

const PREFIX: &str = "Echo: ";

/// Register the echo tool with the tool registry.
pub fn register(registry: &mut ToolRegistry) {
    let tool = MCPTool {
        name: "echo".to_string(),
        description: "Echo back the message".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "message": {
                    "type": "string",
                    "title": "Message"
                }
            },
            "required": ["message"]
        }),
    };

    let handler: ToolHandler = Box::new(|args: &Map<String, Value>| -> Result<Value, ToolError> {
        let message = required_str(args, "message")?;
        Ok(Value::String(echo(message)))
    });

    registry.register(tool, handler);
}

/// `"Echo: " + message`, allocated once.
pub fn echo(message: &str) -> String {
    let mut result = String::with_capacity(PREFIX.len() + message.len());
    result.push_str(PREFIX);
    result.push_str(message);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        registry
    }

    #[test]
    fn test_echo_hello() {
        assert_eq!(echo("hello"), "Echo: hello");
    }

    #[test]
    fn test_echo_preserves_message_exactly() {
        for message in ["", " padded ", "Echo: nested", "ünïcødé ✓", "line\nbreak"] {
            assert_eq!(echo(message), format!("Echo: {message}"));
        }
    }

    #[test]
    fn test_handler_returns_string() {
        let args = json!({ "message": "hello" }).as_object().cloned().unwrap();
        assert_eq!(registry().call("echo", &args), Some(Ok(json!("Echo: hello"))));
    }

    #[test]
    fn test_handler_requires_message() {
        let result = registry().call("echo", &Map::new());
        assert!(matches!(result, Some(Err(ToolError::InvalidArguments(_)))));
    }
}
