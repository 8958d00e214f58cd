/// Configuration and Environment Management
///
/// All settings come from environment variables with defaults matching the
/// fixture's contract (loopback `127.0.0.1:8000`, streamable HTTP on `/mcp`).
/// Values are read through a lookup function so tests can supply their own
/// environment.

use crate::core::error::ConfigError;

/// Transport(s) the host serves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    /// Streamable HTTP only
    Http,
    /// Newline-delimited JSON-RPC on stdin/stdout only
    Stdio,
    /// STDIO in the background, HTTP in the foreground
    Both,
}

impl std::str::FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" | "streamable-http" => Ok(Self::Http),
            "stdio" => Ok(Self::Stdio),
            "both" => Ok(Self::Both),
            _ => Err(ConfigError::InvalidValue {
                key: "MCP_TRANSPORT_MODE",
                value: s.to_string(),
                reason: "must be 'stdio', 'http', or 'both'",
            }),
        }
    }
}

/// Complete host configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Server name as reported in `serverInfo` and `/health`
    pub name: String,
    /// Server version as reported in `serverInfo`
    pub version: String,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
    /// Path of the MCP endpoint, always starting with `/`
    pub mcp_path: String,
    /// Reply with plain JSON bodies even when the client accepts SSE
    pub json_response: bool,
    /// Skip `Mcp-Session-Id` issuing and checking
    pub stateless: bool,
    /// Number of actix worker threads
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "TestServer".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            transport: TransportMode::Http,
            host: "127.0.0.1".to_string(),
            port: 8000,
            mcp_path: "/mcp".to_string(),
            json_response: false,
            stateless: false,
            workers: default_workers(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment Variables:
    /// - SERVER_NAME: Name of the server (default: "TestServer")
    /// - SERVER_VERSION: Version string (default: crate version)
    /// - MCP_TRANSPORT_MODE: "http", "stdio", or "both" (default: "http")
    /// - HOST: Bind address for HTTP mode (default: "127.0.0.1")
    /// - PORT: Port number for HTTP mode (default: 8000)
    /// - MCP_PATH: Endpoint path (default: "/mcp")
    /// - MCP_JSON_RESPONSE: Force JSON replies instead of SSE (default: false)
    /// - MCP_STATELESS: Disable session tracking (default: false)
    /// - WORKER_THREADS: actix workers (default: CPU count, max 16)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve variable names.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let transport = match lookup("MCP_TRANSPORT_MODE") {
            Some(value) => value.parse::<TransportMode>()?,
            None => defaults.transport,
        };

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value,
                reason: "expected a port number between 0 and 65535",
            })?,
            None => defaults.port,
        };

        let mcp_path = lookup("MCP_PATH").unwrap_or(defaults.mcp_path);
        if !mcp_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                key: "MCP_PATH",
                value: mcp_path,
                reason: "must start with '/'",
            });
        }

        let workers = match lookup("WORKER_THREADS") {
            Some(value) => match value.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "WORKER_THREADS",
                        value,
                        reason: "expected a positive integer",
                    });
                }
            },
            None => defaults.workers,
        };

        Ok(Self {
            name: lookup("SERVER_NAME").unwrap_or(defaults.name),
            version: lookup("SERVER_VERSION").unwrap_or(defaults.version),
            transport,
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            mcp_path,
            json_response: parse_flag("MCP_JSON_RESPONSE", lookup("MCP_JSON_RESPONSE"))?,
            stateless: parse_flag("MCP_STATELESS", lookup("MCP_STATELESS"))?,
            workers,
        })
    }

    /// `host:port` string handed to the HTTP listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Defaults to CPU count but capped at 16 to avoid excessive context switching.
fn default_workers() -> usize {
    num_cpus::get().clamp(1, 16)
}

fn parse_flag(key: &'static str, value: Option<String>) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(false);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value,
            reason: "expected a boolean",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults_bind_loopback_8000() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8000");
        assert_eq!(config.transport, TransportMode::Http);
        assert_eq!(config.mcp_path, "/mcp");
        assert_eq!(config.name, "TestServer");
        assert!(!config.json_response);
        assert!(!config.stateless);
        assert!((1..=16).contains(&config.workers));
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "9123"),
            ("HOST", "0.0.0.0"),
            ("MCP_TRANSPORT_MODE", "Both"),
            ("MCP_PATH", "/rpc"),
            ("MCP_JSON_RESPONSE", "true"),
            ("MCP_STATELESS", "1"),
            ("WORKER_THREADS", "2"),
            ("SERVER_NAME", "Fixture"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "0.0.0.0:9123");
        assert_eq!(config.transport, TransportMode::Both);
        assert_eq!(config.mcp_path, "/rpc");
        assert!(config.json_response);
        assert!(config.stateless);
        assert_eq!(config.workers, 2);
        assert_eq!(config.name, "Fixture");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = config_from(&[("PORT", "80000")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn test_invalid_transport_is_rejected() {
        let err = config_from(&[("MCP_TRANSPORT_MODE", "websocket")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "MCP_TRANSPORT_MODE", .. }
        ));
    }

    #[test]
    fn test_path_must_be_absolute() {
        assert!(config_from(&[("MCP_PATH", "mcp")]).is_err());
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        assert!(config_from(&[("WORKER_THREADS", "0")]).is_err());
    }

    #[test]
    fn test_bad_flag_is_rejected() {
        let err = config_from(&[("MCP_STATELESS", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "MCP_STATELESS", .. }));
    }
}
