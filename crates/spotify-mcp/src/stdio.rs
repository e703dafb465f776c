//! Stdio transport for MCP server.
//!
//! Newline-delimited JSON-RPC over stdin/stdout. Stdout carries protocol
//! messages only, so logging must go to stderr.

use crate::error::McpError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, error_codes};
use crate::server::McpServer;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};

/// Line terminator of the stdio framing.
const NEWLINE: u8 = b'\n';

/// Serve MCP over the process's stdin/stdout until stdin is closed.
pub async fn serve_stdio(server: &McpServer) -> Result<(), McpError> {
    tracing::info!("Starting MCP server with stdio transport");
    serve_lines(server, tokio::io::stdin(), tokio::io::stdout()).await?;
    tracing::info!("Stdin closed, stdio transport stopped");
    Ok(())
}

/// Serve MCP over any line-oriented reader/writer pair.
pub async fn serve_lines<R, W>(server: &McpServer, reader: R, mut writer: W) -> Result<(), McpError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(NEWLINE, &mut buf).await? == 0 {
            break;
        }

        let line = buf.trim_ascii();
        if line.is_empty() {
            continue;
        }

        // Lines are parsed as bytes so invalid UTF-8 is a parse error, not an IO error.
        let response = match serde_json::from_slice::<JsonRpcRequest>(line) {
            Ok(request) => server.handle_message(request).await,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse stdio message");
                Some(JsonRpcResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        };

        if let Some(response) = response {
            let mut payload = serde_json::to_string(&response)?;
            payload.push('\n');
            writer.write_all(payload.as_bytes()).await?;
            writer.flush().await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;
    use spotify_api::SpotifyClient;
    use spotify_core::{McpConfig, SpotifyConfig};
    use std::sync::Arc;

    fn offline_server() -> McpServer {
        let client = SpotifyClient::new(&SpotifyConfig::default()).unwrap();
        McpServer::new(McpConfig::default(), Arc::new(client))
    }

    async fn run(input: &str) -> Vec<Value> {
        let server = offline_server();
        let mut output = Vec::new();
        serve_lines(&server, input.as_bytes(), &mut output)
            .await
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn answers_each_request_on_its_own_line() {
        let responses = run(concat!(
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "\n\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#,
            "\n",
        ))
        .await;

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["id"], 1);
        assert_eq!(responses[1]["id"], 2);
        assert_eq!(responses[1]["result"]["tools"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn malformed_lines_get_parse_errors() {
        let responses = run("not json\n").await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[0]["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_stop_the_loop() {
        let server = offline_server();
        let mut input = b"\xff\xfe garbage\n".to_vec();
        input.extend_from_slice(br#"{"jsonrpc":"2.0","id":9,"method":"ping"}"#);
        input.push(b'\n');

        let mut output = Vec::new();
        serve_lines(&server, input.as_slice(), &mut output)
            .await
            .unwrap();

        let responses: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["error"]["code"], -32700);
        assert_eq!(responses[0]["id"], Value::Null);
        assert_eq!(responses[1]["id"], 9);
        assert!(responses[1]["error"].is_null());
    }

    #[tokio::test]
    async fn last_line_without_newline_is_answered() {
        let responses = run(r#"{"jsonrpc":"2.0","id":3,"method":"ping"}"#).await;
        assert_eq!(responses.len(), 1);
        assert_eq!(responses[0]["id"], 3);
    }
}
