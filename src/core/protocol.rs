/// MCP Protocol Layer
///
/// JSON-RPC 2.0 message types, message classification, and the method
/// dispatcher shared by the HTTP and STDIO transports. Nothing here knows about
/// the transport: a message goes in, an optional response comes out.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::error::ToolError;
use crate::core::registry::ToolRegistry;

/// Newest protocol revision; offered when the client asks for an unknown one.
pub const LATEST_PROTOCOL_VERSION: &str = "2025-06-18";

/// Protocol revisions this host can speak, oldest first.
pub const SUPPORTED_PROTOCOL_VERSIONS: &[&str] = &["2024-11-05", "2025-03-26", LATEST_PROTOCOL_VERSION];

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;

/// JSON-RPC 2.0 request or notification.
///
/// A missing (or null) id marks a notification, which gets no response.
#[derive(Deserialize, Debug, Clone)]
pub struct MCPRequest {
    /// JSON-RPC version identifier, must be "2.0"
    pub jsonrpc: String,
    /// Request ID for correlating responses
    #[serde(default)]
    pub id: Option<Value>,
    /// MCP method name (e.g., "initialize", "tools/list", "tools/call")
    pub method: String,
    /// Method-specific parameters
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC 2.0 response structure.
///
/// Exactly one of `result` or `error` is present.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MCPResponse {
    /// Always "2.0"
    pub jsonrpc: &'static str,
    /// Request ID from the original request, null when it could not be read
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<MCPError>,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MCPError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl MCPResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(MCPError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// A classified incoming message.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    /// Has an id and expects exactly one response
    Request(MCPRequest),
    /// Has no id; never answered
    Notification(MCPRequest),
    /// A client's reply to a server-initiated request; accepted and ignored
    Response,
}

/// Classify a raw message body.
///
/// On failure returns the error response to send back; its id is recovered
/// from the body when possible and null otherwise.
pub fn parse_message(body: &[u8]) -> Result<IncomingMessage, MCPResponse> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| MCPResponse::failure(Value::Null, PARSE_ERROR, format!("Parse error: {e}")))?;

    let object = match value {
        Value::Object(object) => object,
        Value::Array(_) => {
            return Err(MCPResponse::failure(
                Value::Null,
                INVALID_REQUEST,
                "Invalid Request: batch messages are not supported",
            ));
        }
        _ => {
            return Err(MCPResponse::failure(
                Value::Null,
                INVALID_REQUEST,
                "Invalid Request: expected a JSON object",
            ));
        }
    };

    let id = object.get("id").cloned().unwrap_or(Value::Null);

    if !object.contains_key("method") && (object.contains_key("result") || object.contains_key("error")) {
        return Ok(IncomingMessage::Response);
    }

    let request: MCPRequest = serde_json::from_value(Value::Object(object))
        .map_err(|e| MCPResponse::failure(id.clone(), INVALID_REQUEST, format!("Invalid Request: {e}")))?;

    if request.jsonrpc != "2.0" {
        return Err(MCPResponse::failure(
            id,
            INVALID_REQUEST,
            format!("Invalid Request: unsupported jsonrpc version {:?}", request.jsonrpc),
        ));
    }

    Ok(match request.id {
        Some(_) => IncomingMessage::Request(request),
        None => IncomingMessage::Notification(request),
    })
}

/// Pick the protocol version to answer `initialize` with.
pub fn negotiate_protocol_version(requested: Option<&str>) -> &'static str {
    requested
        .and_then(|v| SUPPORTED_PROTOCOL_VERSIONS.iter().copied().find(|s| *s == v))
        .unwrap_or(LATEST_PROTOCOL_VERSION)
}

/// Routes MCP methods to their handlers.
///
/// Cheap to clone; the registry is shared.
#[derive(Clone)]
pub struct Dispatcher {
    /// Server name as reported in initialize responses
    pub server_name: String,
    /// Server version as reported in initialize responses
    pub server_version: String,
    pub registry: Arc<ToolRegistry>,
}

impl Dispatcher {
    pub fn new(server_name: impl Into<String>, server_version: impl Into<String>, registry: Arc<ToolRegistry>) -> Self {
        Self {
            server_name: server_name.into(),
            server_version: server_version.into(),
            registry,
        }
    }

    /// Handle one classified message. Returns `None` for notifications and
    /// client responses.
    pub fn handle(&self, message: IncomingMessage) -> Option<MCPResponse> {
        match message {
            IncomingMessage::Request(req) => Some(self.handle_request(req)),
            IncomingMessage::Notification(req) => {
                debug!(method = %req.method, "notification received");
                None
            }
            IncomingMessage::Response => {
                debug!("client response ignored");
                None
            }
        }
    }

    /// Handle a request that carries an id.
    pub fn handle_request(&self, req: MCPRequest) -> MCPResponse {
        let id = req.id.unwrap_or(Value::Null);
        debug!(method = %req.method, %id, "request received");

        let response = match req.method.as_str() {
            "initialize" => self.handle_initialize(id, req.params.as_ref()),
            "ping" => MCPResponse::success(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, req.params.as_ref()),
            _ => MCPResponse::failure(id, METHOD_NOT_FOUND, format!("Method not found: {}", req.method)),
        };

        if let Some(error) = &response.error {
            warn!(method = %req.method, code = error.code, reason = %error.message, "request rejected");
        }
        response
    }

    fn handle_initialize(&self, id: Value, params: Option<&Value>) -> MCPResponse {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);

        MCPResponse::success(
            id,
            json!({
                "protocolVersion": negotiate_protocol_version(requested),
                "capabilities": {
                    "tools": { "listChanged": false }
                },
                "serverInfo": {
                    "name": self.server_name,
                    "version": self.server_version
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Value) -> MCPResponse {
        MCPResponse::success(id, json!({ "tools": self.registry.tools() }))
    }

    fn handle_tools_call(&self, id: Value, params: Option<&Value>) -> MCPResponse {
        let Some(params) = params.and_then(Value::as_object) else {
            return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params: expected an object");
        };

        let Some(tool_name) = params.get("name").and_then(Value::as_str) else {
            return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params: missing tool name");
        };

        let empty = Map::new();
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(args)) => args,
            Some(_) => {
                return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params: arguments must be an object");
            }
        };

        match self.registry.call(tool_name, arguments) {
            None => MCPResponse::failure(id, METHOD_NOT_FOUND, format!("Unknown tool: {tool_name}")),
            Some(Ok(result)) => MCPResponse::success(id, tool_result(result)),
            Some(Err(ToolError::InvalidArguments(reason))) => MCPResponse::failure(
                id,
                INVALID_PARAMS,
                format!("Invalid arguments for tool '{tool_name}': {reason}"),
            ),
            Some(Err(ToolError::Execution(reason))) => {
                warn!(tool = tool_name, %reason, "tool execution failed");
                MCPResponse::success(
                    id,
                    json!({
                        "content": [{ "type": "text", "text": format!("Error: {reason}") }],
                        "isError": true
                    }),
                )
            }
        }
    }
}

/// Wrap a tool's return value as MCP call result content.
///
/// Strings are sent as-is; everything else as its JSON text.
fn tool_result(result: Value) -> Value {
    let text = match &result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    json!({
        "content": [{ "type": "text", "text": text }],
        "structuredContent": { "result": result },
        "isError": false
    })
}
