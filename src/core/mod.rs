/// Core Server Framework Module
///
/// - error.rs: error types for startup and tool calls
/// - protocol.rs: JSON-RPC 2.0 messages and MCP method dispatch
/// - registry.rs: tool registry
/// - server.rs: streamable HTTP transport with Actix Web
/// - session.rs: HTTP session tracking
/// - stdio.rs: line-based STDIO transport
/// - utils.rs: configuration from environment variables

pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod session;
pub mod stdio;
pub mod utils;
