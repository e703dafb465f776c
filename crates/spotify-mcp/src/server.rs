//! MCP server implementation.
//!
//! This module provides the request dispatcher shared by both transports.
//! Tool calls and resource reads always bootstrap the Spotify access token
//! before doing anything else.

use crate::error::McpError;
use crate::protocol::*;
use crate::resources::{ResourceRegistry, SpotifyResource};
use crate::tools::{
    ArgumentError, PAUSE_CONFIRMATION, PLAY_CONFIRMATION, SpotifyTool, ToolCall, ToolRegistry,
};
use serde_json::{Value, json};
use spotify_api::SpotifyApi;
use spotify_core::McpConfig;
use std::sync::Arc;

/// The MCP server.
pub struct McpServer {
    config: McpConfig,
    spotify: Arc<dyn SpotifyApi>,
    tools: ToolRegistry,
    resources: ResourceRegistry,
}

impl McpServer {
    /// Create a new MCP server backed by the given Spotify client.
    pub fn new(config: McpConfig, spotify: Arc<dyn SpotifyApi>) -> Self {
        Self {
            config,
            spotify,
            tools: ToolRegistry::new(),
            resources: ResourceRegistry::new(),
        }
    }

    /// Server configuration.
    pub fn config(&self) -> &McpConfig {
        &self.config
    }

    /// Name and version reported to clients.
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            name: self.config.name.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Handle an incoming message, returning `None` for notifications.
    pub async fn handle_message(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!(method = %request.method, "Received notification");
            self.handle_request(request).await;
            return None;
        }
        Some(self.handle_request(request).await)
    }

    /// Handle a JSON-RPC request.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" | "notifications/initialized" => JsonRpcResponse::success(id, json!({})),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => self.handle_list_tools(id),
            "tools/call" => self.handle_call_tool(id, request.params).await,
            "resources/list" => self.handle_list_resources(id),
            "resources/read" => self.handle_read_resource(id, request.params).await,
            "shutdown" => self.handle_shutdown(id),
            other => error_response(id, &McpError::MethodNotFound(other.to_string())),
        }
    }

    /// Execute a tool call.
    ///
    /// Missing search parameters, schema violations and unknown tool names
    /// come back as `Ok` text replies; Spotify failures are `Err`.
    pub async fn call_tool(&self, params: CallToolParams) -> Result<CallToolResponse, McpError> {
        self.spotify.ensure_access_token().await?;

        let Some(tool) = SpotifyTool::from_name(&params.name) else {
            tracing::warn!(tool = %params.name, "Unknown tool requested");
            return Ok(CallToolResponse::text(format!("Unknown tool: {}", params.name)));
        };

        let call = match tool.parse_arguments(&params.arguments) {
            Ok(call) => call,
            Err(ArgumentError::Schema(reason)) => {
                return Err(McpError::Internal(anyhow::anyhow!(reason)));
            }
            Err(e) => {
                tracing::info!(%tool, reason = %e, "Rejected tool arguments");
                return Ok(CallToolResponse::text(e.to_string()));
            }
        };

        tracing::debug!(%tool, "Calling tool");
        match call {
            ToolCall::Search(args) => {
                let body = self
                    .spotify
                    .search(args.kind, &args.query, args.limit)
                    .await?;
                Ok(CallToolResponse::json(body))
            }
            ToolCall::Play(request) => {
                self.spotify.play(&request).await?;
                Ok(CallToolResponse::text(PLAY_CONFIRMATION))
            }
            ToolCall::Pause => {
                self.spotify.pause().await?;
                Ok(CallToolResponse::text(PAUSE_CONFIRMATION))
            }
        }
    }

    /// Read a resource. Unknown URIs are a hard failure.
    pub async fn read_resource(&self, uri: &str) -> Result<ReadResourceResponse, McpError> {
        self.spotify.ensure_access_token().await?;

        let resource = SpotifyResource::from_uri(uri).ok_or_else(|| McpError::UnknownResource {
            uri: uri.to_string(),
        })?;

        let body = match resource {
            SpotifyResource::CurrentlyPlaying => self.spotify.current_playback().await?,
            SpotifyResource::UserProfile => self.spotify.current_user().await?,
        };

        Ok(ReadResourceResponse {
            contents: vec![ResourceContents {
                uri: uri.to_string(),
                mime_type: resource.mime_type().to_string(),
                text: serde_json::to_string(&body)?,
            }],
        })
    }

    fn handle_initialize(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": self.info(),
            "capabilities": {
                "tools": {
                    "listChanged": false
                },
                "resources": {
                    "subscribe": false,
                    "listChanged": false
                }
            }
        });
        JsonRpcResponse::success(id, result)
    }

    fn handle_list_tools(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ListToolsResponse {
            tools: self.tools.list().to_vec(),
        };
        to_success(id, &result)
    }

    fn handle_list_resources(&self, id: Option<Value>) -> JsonRpcResponse {
        let result = ListResourcesResponse {
            resources: self.resources.list().to_vec(),
        };
        to_success(id, &result)
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> JsonRpcResponse {
        let params: CallToolParams = match parse_params(params) {
            Ok(params) => params,
            Err(e) => return error_response(id, &e),
        };

        match self.call_tool(params).await {
            Ok(result) => to_success(id, &result),
            Err(e) => {
                tracing::warn!(error = %e, "Tool call failed");
                error_response(id, &e)
            }
        }
    }

    async fn handle_read_resource(
        &self,
        id: Option<Value>,
        params: Option<Value>,
    ) -> JsonRpcResponse {
        let params: ReadResourceParams = match parse_params(params) {
            Ok(params) => params,
            Err(e) => return error_response(id, &e),
        };

        match self.read_resource(&params.uri).await {
            Ok(result) => to_success(id, &result),
            Err(e) => {
                tracing::warn!(uri = %params.uri, error = %e, "Resource read failed");
                error_response(id, &e)
            }
        }
    }

    fn handle_shutdown(&self, id: Option<Value>) -> JsonRpcResponse {
        tracing::info!("MCP server shutdown requested");
        JsonRpcResponse::success(id, Value::Null)
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    let params = params.ok_or_else(|| McpError::InvalidParams("Missing params".to_string()))?;
    serde_json::from_value(params).map_err(|e| McpError::InvalidParams(e.to_string()))
}

fn to_success<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => error_response(id, &McpError::from(e)),
    }
}

/// Render an error as a JSON-RPC error response.
pub fn error_response(id: Option<Value>, error: &McpError) -> JsonRpcResponse {
    JsonRpcResponse::error_with_data(id, error.code(), error.to_string(), error.data())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotify_api::SpotifyClient;
    use spotify_core::SpotifyConfig;

    fn offline_server() -> McpServer {
        let client = SpotifyClient::new(&SpotifyConfig::default()).unwrap();
        McpServer::new(McpConfig::default(), Arc::new(client))
    }

    #[tokio::test]
    async fn test_initialize() {
        let server = offline_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1, "initialize", None))
            .await;

        let result = response.result.unwrap();
        assert!(response.error.is_none());
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "spotify-mcp-server");
        assert!(result["capabilities"]["resources"].is_object());
    }

    #[tokio::test]
    async fn test_list_tools() {
        let server = offline_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1, "tools/list", None))
            .await;

        let tools = response.result.unwrap()["tools"].clone();
        assert_eq!(tools.as_array().unwrap().len(), 3);
        assert_eq!(tools[0]["name"], "spotify.search");
        assert_eq!(tools[0]["inputSchema"]["required"], json!(["q", "type"]));
    }

    #[tokio::test]
    async fn test_list_resources() {
        let server = offline_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1, "resources/list", None))
            .await;

        let resources = response.result.unwrap()["resources"].clone();
        assert_eq!(resources.as_array().unwrap().len(), 2);
        assert_eq!(resources[1]["uri"], "spotify:user-profile");
        assert_eq!(resources[1]["mimeType"], "application/json");
    }

    #[tokio::test]
    async fn test_unknown_tool_is_soft_reply() {
        let server = offline_server();
        let response = server
            .handle_request(JsonRpcRequest::new(
                1,
                "tools/call",
                Some(json!({"name": "spotify.queue", "arguments": {}})),
            ))
            .await;

        assert!(response.error.is_none());
        assert_eq!(
            response.result.unwrap()["content"][0]["text"],
            "Unknown tool: spotify.queue"
        );
    }

    #[tokio::test]
    async fn test_unknown_resource_is_error() {
        let server = offline_server();
        let response = server
            .handle_request(JsonRpcRequest::new(
                7,
                "resources/read",
                Some(json!({"uri": "spotify:queue"})),
            ))
            .await;

        assert!(response.result.is_none());
        let error = response.error.unwrap();
        assert_eq!(error.code, -32002);
        assert_eq!(error.message, "Unknown resource: spotify:queue");
        assert_eq!(response.id, Some(json!(7)));
    }

    #[tokio::test]
    async fn test_call_tool_without_params() {
        let server = offline_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1, "tools/call", None))
            .await;
        assert_eq!(response.error.unwrap().code, -32602);
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let server = offline_server();
        let response = server
            .handle_request(JsonRpcRequest::new(1, "prompts/list", None))
            .await;
        let error = response.error.unwrap();
        assert_eq!(error.code, -32601);
        assert_eq!(error.message, "Method not found: prompts/list");
    }

    #[tokio::test]
    async fn test_notifications_get_no_response() {
        let server = offline_server();
        let notification: JsonRpcRequest = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "method": "notifications/initialized"
        }))
        .unwrap();
        assert!(server.handle_message(notification).await.is_none());
    }
}
