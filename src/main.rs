/// MCP Server Entry Point
///
/// Parses environment variables to pick the server (building codes or
/// material specs) and the transport (STDIO or HTTP), loads the dataset and
/// starts the server.
///
/// Environment Variables:
/// - MCP_SERVER_KIND: "building-codes" or "material-specs" (default: "building-codes")
/// - SERVER_NAME: Name of the server (default depends on MCP_SERVER_KIND)
/// - SERVER_VERSION: Version string (default: crate version)
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "stdio")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 3000)
/// - BUILDING_CODES_DATA / MATERIAL_SPECS_DATA: dataset path (default: bundled)
/// - KMCP_CONFIG: per-tool YAML settings (default: "kmcp.yaml")
/// - RUST_LOG: log filter, logs go to stderr (default: "info")

use diy_mcp::core::server::{self, AppState};
use diy_mcp::core::utils::get_env_var;
use diy_mcp::tools::ServerKind;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    // stdout carries JSON-RPC, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let kind_name = get_env_var("MCP_SERVER_KIND", "building-codes");
    let Some(kind) = ServerKind::parse(&kind_name) else {
        tracing::error!(
            kind = %kind_name,
            "invalid MCP_SERVER_KIND, must be 'building-codes' or 'material-specs'"
        );
        std::process::exit(1);
    };

    let state = AppState {
        server_name: get_env_var("SERVER_NAME", kind.default_name()),
        server_version: get_env_var("SERVER_VERSION", env!("CARGO_PKG_VERSION")),
    };

    let registry = match server::initialize_tools(kind) {
        Ok(registry) => registry,
        Err(e) => {
            tracing::error!(error = %e, "failed to load dataset");
            std::process::exit(1);
        }
    };

    let transport = get_env_var("MCP_TRANSPORT_MODE", "stdio");
    let host = get_env_var("HOST", "0.0.0.0");
    let port = get_env_var("PORT", "3000").parse::<u16>().unwrap_or(3000);

    match transport.as_str() {
        "stdio" => server::run_server_stdio(state, registry).await,
        "http" => server::run_server_http(state, registry, host, port).await,
        "both" => {
            // STDIO in the background, HTTP in the foreground
            let stdio_state = state.clone();
            let stdio_registry = registry.clone();
            let stdio_handle = tokio::spawn(async move {
                if let Err(e) = server::run_server_stdio(stdio_state, stdio_registry).await {
                    tracing::error!(error = %e, "STDIO server error");
                }
            });

            let http_result = server::run_server_http(state, registry, host, port).await;

            // If HTTP server exits, abort STDIO task
            stdio_handle.abort();

            http_result
        }
        _ => {
            tracing::error!(
                transport = %transport,
                "invalid transport mode, must be 'stdio', 'http', or 'both'"
            );
            std::process::exit(1);
        }
    }
}
