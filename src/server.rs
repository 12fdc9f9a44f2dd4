//! Minimal MCP server: newline-delimited JSON-RPC 2.0 over stdio.
//!
//! Only the methods a host needs to discover and call tools are handled.
//! Requests are processed one at a time, in arrival order.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::config::ServerConfig;
use crate::registry::ToolRegistry;

const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;

#[derive(Debug, Deserialize)]
struct Request {
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Value,
}

#[derive(Debug, Serialize)]
struct Response {
    jsonrpc: &'static str,
    id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl Response {
    fn result(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    fn error(id: Value, code: i64, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(RpcError {
                code,
                message: message.into(),
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

pub struct McpServer {
    info: ServerConfig,
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(info: ServerConfig, registry: ToolRegistry) -> Self {
        Self { info, registry }
    }

    /// Serve until the reader reaches EOF.
    ///
    /// A bad frame (invalid UTF-8 or JSON) is answered with an error and
    /// the loop carries on.
    pub async fn run<R, W>(&self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut frame = Vec::new();
        loop {
            frame.clear();
            let read = reader
                .read_until(b'\n', &mut frame)
                .await
                .context("Failed to read request")?;
            if read == 0 {
                break;
            }

            let response = match std::str::from_utf8(&frame) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_line(line.trim()).await,
                Err(e) => {
                    log::warn!("Request is not valid UTF-8: {}", e);
                    Some(Response::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)))
                }
            };

            if let Some(response) = response {
                write_response(&mut writer, &response).await?;
            }
        }

        log::info!("Input closed, shutting down");
        Ok(())
    }

    /// Handle one frame. Notifications produce no response.
    async fn handle_line(&self, line: &str) -> Option<Response> {
        let value: Value = match serde_json::from_str(line) {
            Ok(v) => v,
            Err(e) => {
                log::warn!("Malformed request: {}", e);
                return Some(Response::error(Value::Null, PARSE_ERROR, format!("Parse error: {}", e)));
            }
        };

        let request_id = value.get("id").cloned().unwrap_or(Value::Null);
        if !value.is_object() {
            log::warn!("Invalid request: not an object");
            return Some(Response::error(request_id, INVALID_REQUEST, "Invalid request: expected an object"));
        }
        let request: Request = match serde_json::from_value(value) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Invalid request: {}", e);
                return Some(Response::error(
                    request_id,
                    INVALID_REQUEST,
                    format!("Invalid request: {}", e),
                ));
            }
        };

        let Some(id) = request.id else {
            log::debug!("Notification: {}", request.method);
            return None;
        };

        log::debug!("Request {}: {}", id, request.method);
        let response = match request.method.as_str() {
            "initialize" => Response::result(id, self.initialize(&request.params)),
            "ping" => Response::result(id, json!({})),
            "tools/list" => Response::result(id, json!({ "tools": self.registry.definitions() })),
            "tools/call" => self.call_tool(id, request.params).await,
            other => Response::error(id, METHOD_NOT_FOUND, format!("Method not found: {}", other)),
        };
        Some(response)
    }

    fn initialize(&self, params: &Value) -> Value {
        let version = params["protocolVersion"]
            .as_str()
            .unwrap_or(DEFAULT_PROTOCOL_VERSION);
        json!({
            "protocolVersion": version,
            "capabilities": { "tools": {} },
            "serverInfo": {
                "name": self.info.name,
                "version": self.info.version,
            }
        })
    }

    async fn call_tool(&self, id: Value, params: Value) -> Response {
        let params: CallParams = match serde_json::from_value(params) {
            Ok(p) => p,
            Err(e) => return Response::error(id, INVALID_PARAMS, format!("Invalid params: {}", e)),
        };

        match self.registry.call(&params.name, params.arguments).await {
            Ok(result) => Response::result(
                id,
                json!({
                    "content": [{ "type": "text", "text": result.text }],
                    "isError": result.is_error,
                }),
            ),
            Err(e) => {
                log::warn!("{}", e);
                Response::error(id, INVALID_PARAMS, e.to_string())
            }
        }
    }
}

async fn write_response<W>(writer: &mut W, response: &Response) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut frame = serde_json::to_string(response).context("Failed to encode response")?;
    frame.push('\n');
    writer
        .write_all(frame.as_bytes())
        .await
        .context("Failed to write response")?;
    writer.flush().await.context("Failed to flush response")?;
    Ok(())
}
