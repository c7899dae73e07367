/// MCP Server Implementation
///
/// This module contains the core MCP server implementation including:
/// - JSON-RPC 2.0 request/response structures
/// - Tool registry for the catalog of the running server
/// - HTTP server setup with Actix Web
/// - STDIO server implementation for line-based communication
/// - Request handlers for MCP protocol methods

use actix_web::{
    web, App, HttpServer, HttpResponse, Result,
    middleware::{Compress, Logger, DefaultHeaders},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::core::error::{DataLoadError, ToolError};
use crate::core::utils;
use crate::store::{self, BUNDLED_CODES, BUNDLED_PRODUCTS, CodeStore, ProductStore};
use crate::tools::building_codes::{self, BuildingCodes};
use crate::tools::material_specs::{self, MaterialSpecs};
use crate::tools::{self, ServerKind, ToolOutput};

const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server metadata shared across all worker threads in HTTP mode.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server name as reported in MCP initialize responses
    pub server_name: String,
    /// Server version string as reported in MCP initialize responses
    pub server_version: String,
}

/// JSON-RPC 2.0 request structure for MCP protocol.
///
/// `id` is None for notifications, which never get a response.
#[derive(Deserialize, Debug)]
pub struct MCPRequest {
    #[allow(dead_code)]
    #[serde(default)]
    jsonrpc: String,
    #[serde(default)]
    id: Option<Value>,
    method: String,
    #[serde(default)]
    params: Option<Value>,
}

/// JSON-RPC 2.0 response structure for MCP protocol.
#[derive(Serialize, Debug)]
pub struct MCPResponse {
    jsonrpc: String,
    id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<MCPError>,
}

impl MCPResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, code: i32, message: String, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(MCPError { code, message, data }),
        }
    }
}

/// JSON-RPC 2.0 error structure.
#[derive(Serialize, Debug)]
pub struct MCPError {
    /// JSON-RPC error code (e.g., -32601 for method not found)
    code: i32,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

const PARSE_ERROR: i32 = -32700;
const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;

/// MCP tool definition, as listed by `tools/list`.
#[derive(Serialize, Debug, Clone)]
pub struct MCPTool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Tool handler function type definition.
///
/// Handlers take the raw JSON arguments of a `tools/call` and must be
/// Send + Sync to be shared across HTTP worker threads.
pub type ToolHandler = Box<dyn Fn(Value) -> Result<ToolOutput, ToolError> + Send + Sync>;

/// Registry of the tools one server exposes.
///
/// `tools` keeps registration order for `tools/list`; `handlers` maps tool
/// names to their handler for `tools/call`.
pub struct ToolRegistry {
    pub tools: Vec<MCPTool>,
    pub handlers: HashMap<String, ToolHandler>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            handlers: HashMap::new(),
        }
    }

    /// Register a tool. A later registration under the same name replaces
    /// the earlier handler.
    pub fn register(&mut self, tool: MCPTool, handler: ToolHandler) {
        let name = tool.name.clone();
        self.tools.retain(|t| t.name != name);
        self.tools.push(tool);
        self.handlers.insert(name, handler);
    }

    /// Run the tool registered under `name` with raw JSON arguments.
    pub fn invoke(&self, name: &str, arguments: Value) -> Result<ToolOutput, ToolError> {
        let handler = self.handlers.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
        })?;
        handler(arguments)
    }
}

/// Load the dataset of `kind` and build its tool registry.
///
/// Dataset paths come from `BUILDING_CODES_DATA` / `MATERIAL_SPECS_DATA`;
/// the bundled dataset is used when unset. A dataset that cannot be loaded
/// is fatal.
pub fn initialize_tools(kind: ServerKind) -> Result<Arc<ToolRegistry>, DataLoadError> {
    let mut registry = ToolRegistry::new();

    match kind {
        ServerKind::BuildingCodes => {
            let path = utils::get_env_var("BUILDING_CODES_DATA", "");
            let codes: CodeStore = store::load_or_bundled(Some(&path), BUNDLED_CODES, "building codes")?;
            let limit = utils::max_results("search_building_codes", building_codes::DEFAULT_SEARCH_LIMIT);
            tools::register_building_codes(&mut registry, BuildingCodes::new(codes, limit));
        }
        ServerKind::MaterialSpecs => {
            let path = utils::get_env_var("MATERIAL_SPECS_DATA", "");
            let products: ProductStore = store::load_or_bundled(Some(&path), BUNDLED_PRODUCTS, "material specs")?;
            let limit = utils::max_results("search_materials", material_specs::DEFAULT_SEARCH_LIMIT);
            tools::register_material_specs(&mut registry, MaterialSpecs::new(products, limit));
        }
    }

    tracing::info!(server = kind.default_name(), tools = registry.tools.len(), "tool registry ready");
    Ok(Arc::new(registry))
}

/// Handle one raw JSON-RPC message. Returns None for notifications.
///
/// Both transports go through here, so stdio and HTTP answer identically.
pub fn handle_message(state: &AppState, registry: &ToolRegistry, raw: &str) -> Option<MCPResponse> {
    match serde_json::from_str::<MCPRequest>(raw) {
        Ok(req) => handle_request(state, registry, req),
        Err(e) => {
            tracing::warn!(error = %e, "parse error");
            // answer with the id when the message was at least valid JSON
            let id = serde_json::from_str::<Value>(raw)
                .ok()
                .and_then(|partial| partial.get("id").cloned());
            Some(MCPResponse::failure(id, PARSE_ERROR, format!("Parse error: {}", e), None))
        }
    }
}

/// Route a parsed request to its method handler.
pub fn handle_request(state: &AppState, registry: &ToolRegistry, req: MCPRequest) -> Option<MCPResponse> {
    if req.id.is_none() {
        tracing::debug!(method = %req.method, "notification");
        return None;
    }

    let response = match req.method.as_str() {
        "initialize" => handle_initialize(state, req.id),
        "tools/list" => handle_tools_list(registry, req.id),
        "tools/call" => handle_tools_call(registry, req.id, req.params),
        "ping" => MCPResponse::success(req.id, json!({})),
        _ => MCPResponse::failure(
            req.id,
            METHOD_NOT_FOUND,
            format!("Method not found: {}", req.method),
            None,
        ),
    };
    Some(response)
}

/// Handle MCP initialize method.
fn handle_initialize(state: &AppState, id: Option<Value>) -> MCPResponse {
    MCPResponse::success(
        id,
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": {
                "name": state.server_name,
                "version": state.server_version
            }
        }),
    )
}

fn handle_tools_list(registry: &ToolRegistry, id: Option<Value>) -> MCPResponse {
    MCPResponse::success(id, json!({ "tools": registry.tools }))
}

/// Handle MCP tools/call method.
///
/// Unknown tools are a JSON-RPC error. Every other tool failure is returned
/// as a result with `isError: true` and a `{kind, message}` payload so the
/// client can tell argument problems from missing records.
fn handle_tools_call(registry: &ToolRegistry, id: Option<Value>, params: Option<Value>) -> MCPResponse {
    let Some(tool_params) = params else {
        return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params".to_string(), None);
    };

    let Some(tool_name) = tool_params.get("name").and_then(|v| v.as_str()) else {
        return MCPResponse::failure(id, INVALID_PARAMS, "Invalid params: missing tool name".to_string(), None);
    };

    let arguments = tool_params.get("arguments").cloned().unwrap_or_else(|| json!({}));

    match registry.invoke(tool_name, arguments) {
        Ok(output) => {
            tracing::debug!(tool = tool_name, "tool call succeeded");
            MCPResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": output.text
                        }
                    ],
                    "structuredContent": output.data,
                    "isError": false
                }),
            )
        }
        Err(err @ ToolError::UnknownTool { .. }) => {
            tracing::warn!(tool = tool_name, "unknown tool");
            MCPResponse::failure(id, METHOD_NOT_FOUND, err.to_string(), Some(err.to_payload()))
        }
        Err(err) => {
            tracing::info!(tool = tool_name, kind = err.kind(), error = %err, "tool call failed");
            MCPResponse::success(
                id,
                json!({
                    "content": [
                        {
                            "type": "text",
                            "text": format!("Error: {}", err)
                        }
                    ],
                    "structuredContent": { "error": err.to_payload() },
                    "isError": true
                }),
            )
        }
    }
}

/// Health check endpoint handler.
async fn health(state: web::Data<AppState>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(json!({
        "status": "ok",
        "service": state.server_name
    })))
}

/// MCP JSON-RPC request handler with metrics tracking.
///
/// The body is parsed by hand so malformed JSON gets a JSON-RPC parse error
/// instead of a bare 400. Notifications are acknowledged with 202.
async fn mcp_handler(
    state: web::Data<AppState>,
    registry: web::Data<ToolRegistry>,
    counter: web::Data<AtomicU64>,
    body: String,
) -> Result<HttpResponse> {
    counter.fetch_add(1, Ordering::Relaxed);

    match handle_message(&state, &registry, &body) {
        Some(response) => Ok(HttpResponse::Ok().json(response)),
        None => Ok(HttpResponse::Accepted().finish()),
    }
}

/// Metrics endpoint handler: total MCP requests since start.
async fn metrics_handler(counter: web::Data<AtomicU64>) -> Result<HttpResponse> {
    let count = counter.load(Ordering::Relaxed);
    Ok(HttpResponse::Ok().json(json!({
        "requests_total": count,
        "status": "ok"
    })))
}

/// Server-Sent Events endpoint for tools discovery.
///
/// Emits a single event carrying the same tool list as `tools/list`.
async fn sse_tools_discovery(registry: web::Data<ToolRegistry>) -> Result<HttpResponse> {
    use actix_web::http::header;

    let tools_data = json!({
        "tools": registry.tools,
        "count": registry.tools.len()
    });

    let sse_data = format!(
        "data: {}\n\n",
        serde_json::to_string(&tools_data).unwrap_or_else(|_| "{}".to_string())
    );

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(header::CacheControl(vec![
            header::CacheDirective::NoCache,
            header::CacheDirective::NoStore,
            header::CacheDirective::MustRevalidate,
        ]))
        // Disable nginx buffering for real-time streaming
        .insert_header(("x-accel-buffering", "no"))
        .body(sse_data))
}

/// Route table of the HTTP transport. Shared data (`AppState`,
/// `ToolRegistry`, request counter) is attached by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/metrics", web::get().to(metrics_handler))
        .route("/sse", web::get().to(sse_tools_discovery))
        .route("/mcp", web::post().to(mcp_handler))
        .route("/", web::post().to(mcp_handler))
        .route("/", web::get().to(health));
}

/// Run the MCP server in HTTP mode.
///
/// # Configuration
/// - Worker threads: `WORKER_THREADS`, or the CPU count capped at 16
/// - Max connections: 10,000 concurrent connections
/// - Connection rate limit: 1,000 connections per second
/// - Keep-alive and request timeout: 30 seconds
/// - Shutdown timeout: 10 seconds
pub async fn run_server_http(
    state: AppState,
    registry: Arc<ToolRegistry>,
    host: String,
    port: u16,
) -> std::io::Result<()> {
    use std::time::Duration;

    let bind_addr = format!("{}:{}", host, port);

    let app_state = web::Data::new(state);
    let tool_registry = web::Data::from(registry);
    let request_count = web::Data::new(AtomicU64::new(0));

    let workers = utils::get_env_var("WORKER_THREADS", "")
        .parse::<usize>()
        .ok()
        .filter(|n| *n > 0)
        .unwrap_or_else(|| num_cpus::get().clamp(1, 16));

    tracing::info!(
        name = %app_state.server_name,
        version = %app_state.server_version,
        bind = %bind_addr,
        workers,
        "MCP server starting (HTTP mode)"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(tool_registry.clone())
            .app_data(request_count.clone())
            .wrap(Compress::default())
            .wrap(
                DefaultHeaders::new()
                    .add(("X-Content-Type-Options", "nosniff"))
                    .add(("X-Frame-Options", "DENY"))
                    .add(("X-XSS-Protection", "1; mode=block"))
            )
            // %r = request line, %s = status, %Dms = duration in milliseconds
            .wrap(Logger::new("%r %s %Dms"))
            .configure(configure)
    })
    .workers(workers)
    .max_connections(10000)
    .max_connection_rate(1000)
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_secs(30))
    .client_disconnect_timeout(Duration::from_secs(2))
    .shutdown_timeout(10)
    .bind(&bind_addr)?
    .run()
    .await
}

/// Run the MCP server in STDIO mode.
///
/// Reads newline-delimited JSON-RPC requests from stdin and writes one
/// response line per request to stdout. Requests are processed one at a
/// time, in order. All logging goes to stderr.
pub async fn run_server_stdio(state: AppState, registry: Arc<ToolRegistry>) -> std::io::Result<()> {
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};

    tracing::info!(
        name = %state.server_name,
        version = %state.server_version,
        "MCP server starting (STDIO mode)"
    );

    let stdin = tokio::io::stdin();
    let mut stdin = BufReader::with_capacity(8192, stdin).lines();
    let stdout = tokio::io::stdout();
    let mut stdout = BufWriter::with_capacity(8192, stdout);

    while let Some(line) = stdin.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let Some(response) = handle_message(&state, &registry, &line) else {
            continue;
        };

        let response_json = match serde_json::to_string(&response) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response");
                continue;
            }
        };

        stdout.write_all(response_json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        // Flush after each response for low latency
        stdout.flush().await?;
    }

    tracing::info!("stdin closed, shutting down");
    Ok(())
}
