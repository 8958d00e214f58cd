/// Add Tool Implementation
///
/// Sums two integer arguments `a` and `b`.

use serde_json::{Map, Value, json};

use crate::core::error::ToolError;
use crate::core::registry::{MCPTool, ToolHandler, ToolRegistry};
use crate::tools::required_i64;

/// Register the add tool with the tool registry.
pub fn register(registry: &mut ToolRegistry) {
    let tool = MCPTool {
        name: "add".to_string(),
        description: "Add two numbers".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "a": { "type": "integer", "title": "A" },
                "b": { "type": "integer", "title": "B" }
            },
            "required": ["a", "b"]
        }),
    };

    let handler: ToolHandler = Box::new(|args: &Map<String, Value>| -> Result<Value, ToolError> {
        let a = required_i64(args, "a")?;
        let b = required_i64(args, "b")?;
        add(a, b).map(Value::from)
    });

    registry.register(tool, handler);
}

/// `a + b`; overflow is an execution error rather than a wrap or panic.
pub fn add(a: i64, b: i64) -> Result<i64, ToolError> {
    a.checked_add(b)
        .ok_or_else(|| ToolError::Execution(format!("{a} + {b} overflows a 64-bit integer")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(args: Value) -> Option<Result<Value, ToolError>> {
        let mut registry = ToolRegistry::new();
        register(&mut registry);
        registry.call("add", args.as_object().unwrap())
    }

    #[test]
    fn test_add_scenarios() {
        assert_eq!(add(2, 3), Ok(5));
        assert_eq!(add(-1, 1), Ok(0));
        assert_eq!(add(i64::MIN, i64::MAX), Ok(-1));
    }

    #[test]
    fn test_add_overflow_is_execution_error() {
        assert!(matches!(add(i64::MAX, 1), Err(ToolError::Execution(_))));
    }

    #[test]
    fn test_handler_returns_integer() {
        assert_eq!(call(json!({ "a": 2, "b": 3 })), Some(Ok(json!(5))));
    }

    #[test]
    fn test_handler_rejects_non_integer() {
        assert!(matches!(
            call(json!({ "a": "2", "b": 3 })),
            Some(Err(ToolError::InvalidArguments(_)))
        ));
        assert!(matches!(
            call(json!({ "a": 2, "b": 0.5 })),
            Some(Err(ToolError::InvalidArguments(_)))
        ));
        assert!(matches!(
            call(json!({ "a": 2 })),
            Some(Err(ToolError::InvalidArguments(_)))
        ));
    }
}
