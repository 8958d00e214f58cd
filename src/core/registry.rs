/// Tool Registry
///
/// Explicit mapping from tool name to its descriptor (name, description,
/// input schema) and handler. Built once at startup and shared read-only
/// behind an `Arc` by every transport and worker.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

use crate::core::error::ToolError;
use crate::tools;

/// MCP tool definition structure.
///
/// Serialized as-is in `tools/list` responses.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MCPTool {
    /// Unique tool identifier (e.g., "echo", "add")
    pub name: String,
    /// Human-readable description of what the tool does
    pub description: String,
    /// JSON Schema defining the tool's input parameters
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool handler function type definition.
///
/// Handlers receive the call's named arguments and must be Send + Sync to be
/// shared across HTTP worker threads.
pub type ToolHandler = Box<dyn Fn(&Map<String, Value>) -> Result<Value, ToolError> + Send + Sync>;

/// Registry of available MCP tools.
pub struct ToolRegistry {
    /// Tool definitions in registration order (for tools/list)
    tools: Vec<MCPTool>,
    /// Tool names to handlers (for tools/call)
    handlers: HashMap<String, ToolHandler>,
}

impl ToolRegistry {
    /// Create a new empty tool registry.
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Create a registry holding every tool this host serves.
    pub fn with_default_tools() -> Self {
        let mut registry = Self::new();
        tools::register_all(&mut registry);
        registry
    }

    /// Register a tool with the registry.
    ///
    /// Registering a name twice replaces the earlier definition and handler.
    pub fn register(&mut self, tool: MCPTool, handler: ToolHandler) {
        let name = tool.name.clone();
        self.tools.retain(|existing| existing.name != name);
        self.tools.push(tool);
        self.handlers.insert(name, handler);
    }

    /// All tool definitions, in registration order.
    pub fn tools(&self) -> &[MCPTool] {
        &self.tools
    }

    /// Run the named tool. Returns `None` when no such tool is registered.
    pub fn call(&self, name: &str, args: &Map<String, Value>) -> Option<Result<Value, ToolError>> {
        self.handlers.get(name).map(|handler| handler(args))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn constant_tool(name: &str, value: Value) -> (MCPTool, ToolHandler) {
        let tool = MCPTool {
            name: name.to_string(),
            description: format!("Returns a constant from {name}"),
            input_schema: json!({ "type": "object" }),
        };
        let handler: ToolHandler = Box::new(move |_: &Map<String, Value>| -> Result<Value, ToolError> {
            Ok(value.clone())
        });
        (tool, handler)
    }

    #[test]
    fn test_default_tools_are_echo_then_add() {
        let registry = ToolRegistry::with_default_tools();
        let names: Vec<&str> = registry.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["echo", "add"]);
    }

    #[test]
    fn test_call_unknown_tool_returns_none() {
        let registry = ToolRegistry::with_default_tools();
        assert!(registry.call("multiply", &Map::new()).is_none());
    }

    #[test]
    fn test_reregistering_replaces_tool() {
        let mut registry = ToolRegistry::new();
        let (tool, handler) = constant_tool("answer", json!(1));
        registry.register(tool, handler);
        let (tool, handler) = constant_tool("answer", json!(42));
        registry.register(tool, handler);

        assert_eq!(registry.tools().len(), 1);
        assert_eq!(registry.call("answer", &Map::new()), Some(Ok(json!(42))));
    }

    #[test]
    fn test_descriptor_serializes_input_schema_in_camel_case() {
        let (tool, _) = constant_tool("answer", json!(1));
        let value = serde_json::to_value(&tool).unwrap();
        assert!(value.get("inputSchema").is_some());
        assert!(value.get("input_schema").is_none());
    }
}
