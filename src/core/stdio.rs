/// STDIO Transport
///
/// Newline-delimited JSON-RPC on stdin/stdout, one message per line. All
/// logging goes to stderr so the protocol stream stays clean.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tracing::{error, info, warn};

use crate::core::error::ServerError;
use crate::core::protocol::{Dispatcher, MCPResponse, parse_message};

/// Run the MCP server in STDIO mode until stdin closes.
pub async fn run_server_stdio(dispatcher: Dispatcher) -> Result<(), ServerError> {
    info!(
        name = %dispatcher.server_name,
        version = %dispatcher.server_version,
        "MCP server starting (STDIO mode)"
    );

    // 8KB buffers balance memory usage with I/O efficiency
    let stdin = BufReader::with_capacity(8192, tokio::io::stdin());
    let stdout = BufWriter::with_capacity(8192, tokio::io::stdout());
    serve_lines(&dispatcher, stdin, stdout).await?;

    info!("stdin closed, STDIO server stopping");
    Ok(())
}

/// Answer every request line read from `reader` on `writer`.
///
/// Blank lines, notifications, and client responses produce no output. Each
/// reply is flushed as soon as it is written.
pub async fn serve_lines<R, W>(dispatcher: &Dispatcher, mut reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        // Raw bytes: invalid UTF-8 becomes a parse error reply, not a read error.
        if line.trim_ascii().is_empty() {
            continue;
        }

        let response = match parse_message(&line) {
            Ok(message) => dispatcher.handle(message),
            Err(response) => {
                warn!(error = ?response.error, "malformed message");
                Some(response)
            }
        };

        if let Some(response) = response {
            write_response(&mut writer, &response).await?;
        }
    }
    Ok(())
}

async fn write_response<W>(writer: &mut W, response: &MCPResponse) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let json = match serde_json::to_string(response) {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "failed to serialize response");
            return Ok(());
        }
    };
    writer.write_all(json.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}
