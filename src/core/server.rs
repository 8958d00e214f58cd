/// Streamable HTTP Transport
///
/// Serves the MCP endpoint with Actix Web:
/// - POST <path>: one JSON-RPC message per request, answered with a single
///   SSE event or a plain JSON body depending on `Accept`
/// - GET <path>: no server-initiated stream is offered (405)
/// - DELETE <path>: terminate a session
/// - GET /health: readiness probe

use actix_web::{
    App, HttpMessage, HttpRequest, HttpResponse, HttpServer,
    http::{StatusCode, header},
    middleware::{Compress, DefaultHeaders, Logger},
    web,
};
use bytes::Bytes;
use serde_json::Value;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{error, info, warn};

use crate::core::error::ServerError;
use crate::core::protocol::{
    Dispatcher, INVALID_REQUEST, IncomingMessage, MCPResponse, SUPPORTED_PROTOCOL_VERSIONS, parse_message,
};
use crate::core::session::{SESSION_HEADER, SessionStore};
use crate::core::utils::ServerConfig;

/// Header a client uses to state the negotiated protocol revision.
pub const PROTOCOL_VERSION_HEADER: &str = "mcp-protocol-version";

/// Application state shared across all worker threads.
pub struct AppState {
    pub dispatcher: Dispatcher,
    pub sessions: SessionStore,
    /// Reply with JSON even when the client also accepts SSE
    pub json_response: bool,
    /// Skip session issuing and checking
    pub stateless: bool,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher, json_response: bool, stateless: bool) -> Self {
        Self {
            dispatcher,
            sessions: SessionStore::new(),
            json_response,
            stateless,
        }
    }
}

/// Media types the client will take, from its `Accept` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Accepts {
    json: bool,
    event_stream: bool,
}

impl Accepts {
    fn from_request(req: &HttpRequest) -> Self {
        let Some(accept) = req.headers().get(header::ACCEPT).and_then(|v| v.to_str().ok()) else {
            // No Accept header means anything goes; answer with JSON.
            return Self { json: true, event_stream: false };
        };

        let mut accepts = Self { json: false, event_stream: false };
        for media in accept.split(',') {
            let essence = media.split(';').next().unwrap_or("").trim().to_ascii_lowercase();
            match essence.as_str() {
                "application/json" | "application/*" | "*/*" => accepts.json = true,
                "text/event-stream" | "text/*" => accepts.event_stream = true,
                _ => {}
            }
        }
        accepts
    }

    fn any(self) -> bool {
        self.json || self.event_stream
    }
}

/// Register the MCP endpoint at `mcp_path` plus `/health`.
///
/// Expects a `web::Data<AppState>` to be registered on the app.
pub fn configure_routes(cfg: &mut web::ServiceConfig, mcp_path: &str) {
    cfg.route("/health", web::get().to(health)).service(
        web::resource(mcp_path)
            .route(web::post().to(handle_post))
            .route(web::get().to(handle_get))
            .route(web::delete().to(handle_delete)),
    );
}

/// Health check endpoint handler.
async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": state.dispatcher.server_name
    }))
}

/// Build a transport-level rejection carrying a JSON-RPC error body.
fn reject(status: StatusCode, message: &str) -> HttpResponse {
    warn!(status = status.as_u16(), reason = message, "request rejected");
    HttpResponse::build(status).json(MCPResponse::failure(Value::Null, INVALID_REQUEST, message))
}

/// Format one JSON-RPC response as an SSE `message` event.
fn sse_event(response: &MCPResponse) -> Result<Bytes, serde_json::Error> {
    let json = serde_json::to_string(response)?;
    Ok(Bytes::from(format!("event: message\ndata: {json}\n\n")))
}

/// MCP JSON-RPC message handler.
///
/// Validates headers and session, dispatches the message, and picks the reply
/// framing. Client mistakes are answered with a 4xx and never affect other
/// requests.
async fn handle_post(req: HttpRequest, body: web::Bytes, state: web::Data<AppState>) -> HttpResponse {
    let accepts = Accepts::from_request(&req);
    if !accepts.any() {
        return reject(
            StatusCode::NOT_ACCEPTABLE,
            "Not Acceptable: client must accept application/json or text/event-stream",
        );
    }

    if req.content_type() != "application/json" {
        return reject(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "Unsupported Media Type: Content-Type must be application/json",
        );
    }

    if let Some(version) = req.headers().get(PROTOCOL_VERSION_HEADER) {
        let supported = version
            .to_str()
            .map(|v| SUPPORTED_PROTOCOL_VERSIONS.contains(&v.trim()))
            .unwrap_or(false);
        if !supported {
            return reject(StatusCode::BAD_REQUEST, "Bad Request: Unsupported protocol version");
        }
    }

    let message = match parse_message(&body) {
        Ok(message) => message,
        Err(response) => {
            warn!(error = ?response.error, "malformed message");
            return HttpResponse::BadRequest().json(response);
        }
    };

    let mut new_session = None;
    if !state.stateless {
        let is_initialize = matches!(&message, IncomingMessage::Request(r) if r.method == "initialize");
        if is_initialize {
            let id = state.sessions.create();
            info!(session = %id, "session opened");
            new_session = Some(id);
        } else {
            match req.headers().get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
                None => return reject(StatusCode::BAD_REQUEST, "Bad Request: Missing session ID"),
                Some(id) if !state.sessions.contains(id) => {
                    return reject(StatusCode::NOT_FOUND, "Session not found");
                }
                Some(_) => {}
            }
        }
    }

    let Some(response) = state.dispatcher.handle(message) else {
        return HttpResponse::Accepted().finish();
    };

    let mut builder = HttpResponse::Ok();
    if let Some(id) = new_session {
        builder.insert_header((SESSION_HEADER, id));
    }

    let use_sse = accepts.event_stream && !(state.json_response && accepts.json);
    if !use_sse {
        return builder.json(response);
    }

    match sse_event(&response) {
        Ok(event) => builder
            .content_type("text/event-stream")
            .insert_header(header::CacheControl(vec![header::CacheDirective::NoCache]))
            // Disable nginx buffering for real-time streaming
            .insert_header(("x-accel-buffering", "no"))
            .streaming(futures_util::stream::once(async move { Ok::<_, Infallible>(event) })),
        Err(e) => {
            error!(error = %e, "failed to serialize response");
            HttpResponse::InternalServerError().finish()
        }
    }
}

/// The host never pushes server-initiated messages, so there is no stream to
/// open.
async fn handle_get(state: web::Data<AppState>) -> HttpResponse {
    let allow = if state.stateless { "POST" } else { "POST, DELETE" };
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, allow))
        .json(MCPResponse::failure(Value::Null, INVALID_REQUEST, "Method Not Allowed"))
}

/// Terminate the session named by the `Mcp-Session-Id` header.
async fn handle_delete(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    if state.stateless {
        return HttpResponse::MethodNotAllowed()
            .insert_header((header::ALLOW, "POST"))
            .finish();
    }

    match req.headers().get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
        None => reject(StatusCode::BAD_REQUEST, "Bad Request: Missing session ID"),
        Some(id) if state.sessions.remove(id) => {
            info!(session = %id, "session closed");
            HttpResponse::Ok().finish()
        }
        Some(_) => reject(StatusCode::NOT_FOUND, "Session not found"),
    }
}

/// Run the MCP server in HTTP mode.
///
/// Binding happens before anything is served; a bind failure (e.g. port
/// already in use) is returned as `ServerError::Bind`. Runs until the process
/// is terminated.
pub async fn run_server_http(config: &ServerConfig, dispatcher: Dispatcher) -> Result<(), ServerError> {
    let bind_addr = config.bind_addr();
    let mcp_path = config.mcp_path.clone();
    let state = web::Data::new(AppState::new(dispatcher, config.json_response, config.stateless));

    info!(
        name = %config.name,
        version = %config.version,
        bind = %bind_addr,
        path = %mcp_path,
        workers = config.workers,
        json_response = config.json_response,
        stateless = config.stateless,
        "MCP server starting (HTTP mode)"
    );

    let server = HttpServer::new(move || {
        let mcp_path = mcp_path.clone();
        App::new()
            .app_data(state.clone())
            .wrap(Compress::default())
            .wrap(DefaultHeaders::new().add(("X-Content-Type-Options", "nosniff")))
            // Format: %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(move |cfg| configure_routes(cfg, &mcp_path))
    })
    .workers(config.workers)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)
    .map_err(|source| ServerError::Bind {
        addr: bind_addr.clone(),
        source,
    })?;

    info!(bind = %bind_addr, "listening");
    server.run().await?;
    Ok(())
}
