//! HTTP transport for MCP server.
//!
//! This module provides the HTTP listener and the SSE transport used by
//! browser-based clients:
//!
//! - `GET {sse_path}` opens an event stream. The first event (`endpoint`)
//!   tells the client where to POST its messages.
//! - `POST {messages_path}?sessionId=...` delivers one JSON-RPC message; the
//!   response is pushed back on the session's stream as a `message` event.
//! - `GET /` describes the service, `OPTIONS` on any path is a CORS preflight,
//!   and everything else is a plain-text 404.

use crate::error::McpError;
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, error_codes};
use crate::server::McpServer;
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, Request, State},
    http::{HeaderValue, Method, StatusCode, Uri, header},
    middleware::{self, Next},
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::{get, post},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

/// Events buffered per SSE session before senders wait.
const SESSION_BUFFER: usize = 100;

/// SSE event for streaming.
#[derive(Debug, Clone)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

/// SSE transport: one event stream per connected client, all sharing the
/// same dispatcher.
pub struct SseTransport {
    server: Arc<McpServer>,
    messages_path: String,
    sessions: RwLock<HashMap<String, mpsc::Sender<SseEvent>>>,
}

impl SseTransport {
    /// Create a new SSE transport.
    pub fn new(server: Arc<McpServer>, messages_path: impl Into<String>) -> Self {
        Self {
            server,
            messages_path: messages_path.into(),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    fn session(&self, session_id: &str) -> Option<mpsc::Sender<SseEvent>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    fn remove_session(&self, session_id: &str) {
        let removed = self
            .sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(session_id);
        if removed.is_some() {
            tracing::info!(session_id, "SSE client disconnected");
        }
    }

    /// Open a new session and return its event stream. The session is
    /// removed as soon as the stream is dropped.
    pub fn handshake(self: &Arc<Self>) -> Response {
        let session_id = uuid::Uuid::new_v4().to_string();
        let (event_tx, event_rx) = mpsc::channel(SESSION_BUFFER);

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(session_id.clone(), event_tx);

        tracing::info!(session_id = %session_id, "SSE client connected");

        let endpoint = format!("{}?sessionId={}", self.messages_path, session_id);
        let guard = SessionGuard {
            transport: Arc::clone(self),
            session_id,
        };
        let stream = async_stream::stream! {
            let _guard = guard;
            yield Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint));

            let mut rx = event_rx;
            while let Some(event) = rx.recv().await {
                yield Ok(Event::default().event(event.event).data(event.data));
            }
        };

        Sse::new(stream)
            .keep_alive(
                KeepAlive::new()
                    .interval(Duration::from_secs(30))
                    .text("ping"),
            )
            .into_response()
    }

    /// Accept a message for a session. The request is dispatched in the
    /// background and its response, if any, is pushed onto the session's
    /// stream.
    pub async fn deliver(
        self: &Arc<Self>,
        session_id: &str,
        request: JsonRpcRequest,
    ) -> Result<(), McpError> {
        if self.session(session_id).is_none() {
            return Err(McpError::TransportError(format!(
                "unknown session: {}",
                session_id
            )));
        }

        let transport = Arc::clone(self);
        let session_id = session_id.to_string();
        tokio::spawn(async move {
            if let Some(response) = transport.server.handle_message(request).await {
                transport.send(&session_id, &response).await;
            }
        });

        Ok(())
    }

    async fn send(&self, session_id: &str, response: &JsonRpcResponse) {
        let data = match serde_json::to_string(response) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize SSE response");
                return;
            }
        };

        let Some(sender) = self.session(session_id) else {
            tracing::debug!(session_id, "Dropping response for closed session");
            return;
        };

        let event = SseEvent {
            event: "message".to_string(),
            data,
        };
        if sender.send(event).await.is_err() {
            self.remove_session(session_id);
        }
    }
}

/// Unregisters a session when its event stream goes away.
struct SessionGuard {
    transport: Arc<SseTransport>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.transport.remove_session(&self.session_id);
    }
}

/// Service descriptor returned on `GET /`.
#[derive(Debug, Clone)]
pub struct ServiceInfo {
    pub name: String,
    pub version: String,
    pub sse_path: String,
    pub messages_path: String,
}

/// HTTP listener state.
pub struct HttpState {
    info: ServiceInfo,
    sse: Option<Arc<SseTransport>>,
}

impl HttpState {
    /// Listener state with an SSE transport attached to `server`.
    pub fn new(server: Arc<McpServer>) -> Result<Self, McpError> {
        let info = service_info(&server);
        check_routes(&info)?;
        let sse = Arc::new(SseTransport::new(server, info.messages_path.clone()));
        Ok(Self {
            info,
            sse: Some(sse),
        })
    }

    /// Listener state without an SSE transport; the stream endpoints answer 500.
    pub fn without_sse(info: ServiceInfo) -> Result<Self, McpError> {
        check_routes(&info)?;
        Ok(Self { info, sse: None })
    }
}

fn service_info(server: &McpServer) -> ServiceInfo {
    let config = server.config();
    ServiceInfo {
        name: config.name.clone(),
        version: server.info().version,
        sse_path: normalize_path(&config.sse_path),
        messages_path: normalize_path(&config.messages_path),
    }
}

/// The SSE and message endpoints must not collide with `/` or each other.
fn check_routes(info: &ServiceInfo) -> Result<(), McpError> {
    let conflict = if info.sse_path == "/" || info.messages_path == "/" {
        Some("SSE and message paths must not be `/`")
    } else if info.sse_path == info.messages_path {
        Some("SSE and message paths must differ")
    } else {
        None
    };

    match conflict {
        Some(reason) => Err(McpError::StartupFailed(format!(
            "{} (sse: {}, messages: {})",
            reason, info.sse_path, info.messages_path
        ))),
        None => Ok(()),
    }
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Query parameters for the message endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Create the HTTP router.
pub fn create_router(state: Arc<HttpState>) -> Router {
    let sse_path = state.info.sse_path.clone();
    let messages_path = state.info.messages_path.clone();

    Router::new()
        .route("/", get(handle_info).fallback(handle_not_found))
        .route(&sse_path, get(handle_sse).fallback(handle_not_found))
        .route(&messages_path, post(handle_message).fallback(handle_not_found))
        .fallback(handle_not_found)
        .layer(middleware::from_fn(cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Answer preflights with 204 and attach CORS headers to every response.
async fn cors(request: Request, next: Next) -> Response {
    let mut response = if *request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET,OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

/// Handle `GET /`.
async fn handle_info(State(state): State<Arc<HttpState>>, uri: Uri) -> Response {
    if uri.query().is_some() {
        return handle_not_found().await;
    }

    Json(serde_json::json!({
        "name": state.info.name,
        "version": state.info.version,
        "transport": "sse",
        "ssePath": state.info.sse_path
    }))
    .into_response()
}

/// Handle `GET {sse_path}`.
async fn handle_sse(State(state): State<Arc<HttpState>>) -> Response {
    match &state.sse {
        Some(transport) => transport.handshake(),
        None => missing_transport(),
    }
}

/// Handle `POST {messages_path}`.
async fn handle_message(
    State(state): State<Arc<HttpState>>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> Response {
    let Some(transport) = &state.sse else {
        return missing_transport();
    };

    let Some(session_id) = query.session_id else {
        return plain_text(StatusCode::BAD_REQUEST, "Missing sessionId");
    };

    let request: JsonRpcRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            let error =
                JsonRpcResponse::error(None, error_codes::PARSE_ERROR, format!("Parse error: {}", e));
            return (StatusCode::BAD_REQUEST, Json(error)).into_response();
        }
    };

    match transport.deliver(&session_id, request).await {
        Ok(()) => (StatusCode::ACCEPTED, "Accepted").into_response(),
        Err(e) => {
            tracing::warn!(session_id = %session_id, error = %e, "Rejected SSE message");
            plain_text(StatusCode::NOT_FOUND, "Session not found")
        }
    }
}

async fn handle_not_found() -> Response {
    plain_text(StatusCode::NOT_FOUND, "Not found")
}

fn missing_transport() -> Response {
    plain_text(
        StatusCode::INTERNAL_SERVER_ERROR,
        "SSE transport does not expose a handshake handler",
    )
}

fn plain_text(status: StatusCode, body: &'static str) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}

/// HTTP server for the SSE transport.
pub struct HttpServer {
    addr: String,
    sse_url: String,
    state: Arc<HttpState>,
}

impl HttpServer {
    /// Create a new HTTP server for `server`, bound per its configuration.
    /// Fails when the configured endpoint paths collide.
    pub fn new(server: Arc<McpServer>) -> Result<Self, McpError> {
        let config = server.config();
        let addr = config.bind_addr();
        let sse_url = config.sse_url();
        Ok(Self {
            addr,
            sse_url,
            state: Arc::new(HttpState::new(server)?),
        })
    }

    /// Run the HTTP server.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| McpError::StartupFailed(format!("Failed to bind to {}: {}", self.addr, e)))?;

        tracing::info!(addr = %self.addr, "SSE listening at {}", self.sse_url);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
