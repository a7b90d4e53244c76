//! MCP Protocol Handler
//!
//! Exposes the armory over JSON-RPC 2.0 on stdio so other agents can discover
//! and invoke its weapons.
//! Reference: https://modelcontextprotocol.io/specification

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::armory::ToolRegistry;
use crate::error::ArmoryError;

/// Server name reported by `initialize`
pub const SERVER_NAME: &str = "armory";

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Deserialize)]
pub struct McpRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize)]
pub struct McpResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<McpError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize)]
pub struct McpError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl McpResponse {
    pub fn success(id: Option<serde_json::Value>, result: serde_json::Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: Option<serde_json::Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(McpError {
                code,
                message: message.into(),
                data: None,
            }),
            id,
        }
    }

    /// Attach structured error data
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        if let Some(error) = self.error.as_mut() {
            error.data = Some(data);
        }
        self
    }
}

/// JSON-RPC error codes
pub mod error_codes {
    // JSON-RPC standard errors
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;

    // Application errors (-32000 to -32099)
    pub const TOOL_NOT_FOUND: i32 = -32000;
    pub const TASK_NOT_FOUND: i32 = -32001;
    pub const TASK_NOT_CANCELABLE: i32 = -32002;
}

/// Armory MCP server
pub struct McpServer {
    tools: Arc<ToolRegistry>,
}

impl McpServer {
    pub fn new(tools: Arc<ToolRegistry>) -> Self {
        Self { tools }
    }

    /// Run the MCP server (stdio mode)
    pub async fn run(&self) -> anyhow::Result<()> {
        let stdin = tokio::io::stdin();
        let mut stdout = tokio::io::stdout();
        let mut reader = BufReader::new(stdin);
        let mut line = String::new();

        info!("Armory MCP server ready with {} weapons", self.tools.len());

        loop {
            line.clear();
            let bytes_read = reader.read_line(&mut line).await?;

            if bytes_read == 0 {
                info!("Client disconnected (EOF)");
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            debug!("← {}", trimmed);

            let Some(response) = self.handle_message(trimmed) else {
                continue;
            };

            let response_json = serde_json::to_string(&response)?;
            debug!("→ {}", response_json);

            stdout.write_all(response_json.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }

        Ok(())
    }

    /// Handle one raw line; `None` for notifications
    pub fn handle_message(&self, raw: &str) -> Option<McpResponse> {
        match serde_json::from_str::<McpRequest>(raw) {
            Ok(request) => {
                if request.id.is_none() && request.method.starts_with("notifications/") {
                    debug!("Received notification: {}", request.method);
                    return None;
                }
                Some(self.handle_request(request))
            }
            Err(e) => {
                error!("Parse error: {}", e);
                Some(McpResponse::error(
                    None,
                    error_codes::PARSE_ERROR,
                    format!("Parse error: {}", e),
                ))
            }
        }
    }

    /// Handle a single MCP request
    pub fn handle_request(&self, request: McpRequest) -> McpResponse {
        if request.jsonrpc != "2.0" {
            return McpResponse::error(
                request.id,
                error_codes::INVALID_REQUEST,
                "Only JSON-RPC 2.0 is supported",
            );
        }

        match request.method.as_str() {
            // Lifecycle
            "initialize" => self.handle_initialize(request.id),
            "shutdown" => {
                info!("Shutdown requested");
                McpResponse::success(request.id, serde_json::json!({}))
            }

            // Tools
            "tools/list" => self.handle_tools_list(request.id),
            "tools/call" => self.handle_tools_call(request.id, request.params),

            // Ping
            "ping" => McpResponse::success(request.id, serde_json::json!({})),

            // Unknown
            method => {
                warn!("Unknown method: {}", method);
                McpResponse::error(
                    request.id,
                    error_codes::METHOD_NOT_FOUND,
                    format!("Method not found: {}", method),
                )
            }
        }
    }

    fn handle_initialize(&self, id: Option<serde_json::Value>) -> McpResponse {
        McpResponse::success(
            id,
            serde_json::json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {
                        // The arsenal is fixed at startup
                        "listChanged": false
                    }
                },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": env!("CARGO_PKG_VERSION")
                }
            }),
        )
    }

    fn handle_tools_list(&self, id: Option<serde_json::Value>) -> McpResponse {
        let tools = self.tools.list_definitions();
        McpResponse::success(id, serde_json::json!({ "tools": tools }))
    }

    fn handle_tools_call(
        &self,
        id: Option<serde_json::Value>,
        params: serde_json::Value,
    ) -> McpResponse {
        let name = match params.get("name").and_then(|v| v.as_str()) {
            Some(n) => n,
            None => {
                return McpResponse::error(
                    id,
                    error_codes::INVALID_PARAMS,
                    "Missing 'name' parameter",
                )
            }
        };

        match self.tools.invoke(name) {
            Ok(result) => {
                info!(
                    "{} → {} {} damage (crit {})",
                    name, result.base_damage, result.damage_type, result.critical_hit_chance
                );
                let structured = serde_json::to_value(&result).unwrap_or_default();
                McpResponse::success(
                    id,
                    serde_json::json!({
                        "content": [{
                            "type": "text",
                            "text": structured.to_string()
                        }],
                        "structuredContent": structured,
                        "isError": false
                    }),
                )
            }
            Err(e @ ArmoryError::UnknownTool(_)) => {
                McpResponse::error(id, error_codes::TOOL_NOT_FOUND, e.to_string())
                    .with_data(serde_json::json!({ "kind": "UnknownToolError" }))
            }
            Err(e) => McpResponse::error(id, error_codes::INTERNAL_ERROR, e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::armory::standard_registry;

    fn server() -> McpServer {
        McpServer::new(Arc::new(standard_registry().unwrap()))
    }

    fn call(server: &McpServer, raw: &str) -> serde_json::Value {
        let response = server.handle_message(raw).unwrap();
        serde_json::to_value(&response).unwrap()
    }

    #[test]
    fn test_initialize() {
        let json = call(&server(), r#"{"jsonrpc":"2.0","id":1,"method":"initialize"}"#);
        assert_eq!(json["result"]["serverInfo"]["name"], "armory");
        assert_eq!(json["result"]["capabilities"]["tools"]["listChanged"], false);
    }

    #[test]
    fn test_notification_has_no_response() {
        let server = server();
        assert!(server
            .handle_message(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .is_none());
    }

    #[test]
    fn test_tools_list_in_registration_order() {
        let json = call(&server(), r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#);
        let tools = json["result"]["tools"].as_array().unwrap();
        assert_eq!(tools[0]["name"], "forge_broadsword");
        assert!(tools[0]["description"]
            .as_str()
            .unwrap()
            .contains("Weaver of Spaghetti Code"));
        assert_eq!(
            tools[0]["outputSchema"]["properties"]["base_damage"]["type"],
            "number"
        );
    }

    #[test]
    fn test_tools_call() {
        let json = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"forge_broadsword","arguments":{}}}"#,
        );
        let result = &json["result"]["structuredContent"];
        assert_eq!(result["weapon_name"], "Forged Broadsword");
        let damage = result["base_damage"].as_i64().unwrap();
        assert!((110..=140).contains(&damage));

        let text = json["result"]["content"][0]["text"].as_str().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(&parsed, result);
    }

    #[test]
    fn test_tools_call_unknown() {
        let json = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"nonexistent"}}"#,
        );
        assert_eq!(json["error"]["code"], error_codes::TOOL_NOT_FOUND);
        assert_eq!(json["error"]["data"]["kind"], "UnknownToolError");
    }

    #[test]
    fn test_tools_call_missing_name() {
        let json = call(
            &server(),
            r#"{"jsonrpc":"2.0","id":5,"method":"tools/call","params":{}}"#,
        );
        assert_eq!(json["error"]["code"], error_codes::INVALID_PARAMS);
    }

    #[test]
    fn test_parse_error_and_unknown_method() {
        let server = server();
        let json = call(&server, "{not json");
        assert_eq!(json["error"]["code"], error_codes::PARSE_ERROR);

        let json = call(&server, r#"{"jsonrpc":"2.0","id":6,"method":"resources/list"}"#);
        assert_eq!(json["error"]["code"], error_codes::METHOD_NOT_FOUND);
    }
}
