/// Error Types
///
/// Startup errors (`ConfigError`, `ServerError`) are fatal and stop the process
/// before any request is served. `ToolError` is per-call and only ever turns
/// into a response for the offending request.

use thiserror::Error;

/// Invalid value found while reading configuration from the environment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Fatal error raised while starting or running a transport.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of a single tool invocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolError {
    /// Arguments were missing or had the wrong type. Reported as JSON-RPC
    /// invalid params.
    #[error("{0}")]
    InvalidArguments(String),

    /// The tool ran but could not produce a result. Reported as a tool result
    /// with `isError: true`.
    #[error("{0}")]
    Execution(String),
}
