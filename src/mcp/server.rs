//! MCP JSON-RPC 2.0 server. One request per line in, one response per line out.
//!
//! Tracing output goes to stderr so it doesn't interfere with the protocol.

use std::io::{self, BufRead, Write};

use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::tools;
use super::types::*;
use crate::service::FileRankService;

const PROTOCOL_VERSION: &str = "2024-11-05";

/// Serve requests from stdin until it closes.
pub fn run(service: &mut FileRankService) -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    serve(service, stdin.lock(), stdout.lock())
}

/// Serve newline-delimited requests from `input`, writing responses to `output`.
pub fn serve<R: BufRead, W: Write>(
    service: &mut FileRankService,
    input: R,
    mut output: W,
) -> io::Result<()> {
    info!("MCP server starting");
    for line in input.lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Some(response) = handle_line(service, trimmed) {
            let json = serde_json::to_string(&response)?;
            debug!(response = %json, "sending response");
            writeln!(output, "{}", json)?;
            output.flush()?;
        }
    }
    info!("MCP server shutting down");
    Ok(())
}

/// Handle one request line. Notifications produce no response.
pub fn handle_line(service: &mut FileRankService, line: &str) -> Option<JsonRpcResponse> {
    debug!(request = %line, "received request");
    let request: JsonRpcRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            warn!(error = %e, "invalid JSON-RPC request");
            return Some(JsonRpcResponse::error(
                None,
                PARSE_ERROR,
                format!("Parse error: {}", e),
            ));
        }
    };
    handle_request(service, request)
}

fn handle_request(
    service: &mut FileRankService,
    request: JsonRpcRequest,
) -> Option<JsonRpcResponse> {
    let id = request.id;

    match request.method.as_str() {
        "initialize" => {
            info!("client initializing");
            let result = InitializeResult {
                protocol_version: PROTOCOL_VERSION,
                capabilities: ServerCapabilities { tools: json!({}) },
                server_info: ServerInfo {
                    name: "filerank",
                    version: env!("CARGO_PKG_VERSION"),
                },
            };
            Some(JsonRpcResponse::from_serialize(id, &result))
        }

        method if method.starts_with("notifications/") => {
            debug!(method, "notification");
            None
        }

        "ping" => Some(JsonRpcResponse::success(id, json!({}))),

        "tools/list" => {
            let result = ToolsListResult {
                tools: tools::list_tools(),
            };
            Some(JsonRpcResponse::from_serialize(id, &result))
        }

        "tools/call" => {
            let params: ToolsCallParams = match serde_json::from_value(request.params) {
                Ok(p) => p,
                Err(e) => {
                    return Some(JsonRpcResponse::error(
                        id,
                        INVALID_PARAMS,
                        format!("Invalid params: {}", e),
                    ));
                }
            };
            debug!(tool = %params.name, "calling tool");
            let arguments = match params.arguments {
                Value::Null => json!({}),
                other => other,
            };
            let result = tools::call_tool(service, &params.name, &arguments);
            Some(JsonRpcResponse::from_serialize(id, &result))
        }

        _ => {
            warn!(method = %request.method, "unknown method");
            Some(JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                format!("Method not found: {}", request.method),
            ))
        }
    }
}
