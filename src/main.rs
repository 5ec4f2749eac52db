// src/main.rs

use ccip_mcp_server::{
    api,
    blockchain::EvmClientFactory,
    config::Config,
    mcp::{
        handler::handle_mcp_request,
        protocol::{error_codes, Request, Response},
    },
    AppState,
};
use std::env;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt};
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// --- HTTP Server Logic ---
async fn run_http_server(state: AppState) {
    let addr = SocketAddr::from(([127, 0, 0, 1], state.config.port));
    let app = api::create_router(state);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("❌ Failed to bind {}: {}", addr, e);
            return;
        }
    };
    info!("🚀 HTTP Server listening on {}", addr);

    if let Err(e) = axum::serve(listener, app.into_make_service()).await {
        error!("HTTP server stopped: {}", e);
    }
}

// --- MCP Server Logic ---
async fn run_mcp_server(state: AppState) {
    info!("🚀 Starting MCP server on stdin/stdout...");

    let mut stdin = io::BufReader::new(io::stdin());
    let mut stdout = io::stdout();

    loop {
        let mut line = String::new();

        match stdin.read_line(&mut line).await {
            Ok(0) => {
                info!("EOF received, shutting down MCP server");
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Tool arguments may carry a private key, so only the size is logged
                debug!("Received {} bytes", line.len());

                let response = match serde_json::from_str::<Request>(line) {
                    Ok(request) => handle_mcp_request(request, state.clone()).await,
                    Err(parse_error) => {
                        error!("JSON parse error: {}", parse_error);
                        Some(Response::error(
                            serde_json::Value::Null,
                            error_codes::PARSE_ERROR,
                            format!("Parse error: {}", parse_error),
                        ))
                    }
                };

                if let Some(response) = response {
                    match serde_json::to_string(&response) {
                        Ok(response_json) => {
                            debug!("Sending: {}", response_json);
                            let frame = format!("{}\n", response_json);
                            if let Err(e) = stdout.write_all(frame.as_bytes()).await {
                                error!("Failed to write response: {}", e);
                                break;
                            }
                            if let Err(e) = stdout.flush().await {
                                error!("Failed to flush stdout: {}", e);
                                break;
                            }
                        }
                        Err(e) => error!("Failed to serialize response: {}", e),
                    }
                }
            }
            Err(e) => {
                error!("Failed to read from stdin: {}", e);
                break;
            }
        }
    }

    info!("MCP server shutting down");
}

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries MCP frames
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ccip_mcp_server=debug,ccip_mcp=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("❌ Failed to load configuration: {:#}", e);
            return;
        }
    };

    if config.chain_rpc_urls.is_empty() {
        warn!("CHAIN_RPC_URLS is not set; transfers will fail at the first step");
    } else {
        info!("RPC endpoints configured for: {}", config.configured_chains().join(", "));
    }

    let client_factory = match EvmClientFactory::from_config(&config) {
        Ok(factory) => factory,
        Err(e) => {
            error!("❌ Failed to initialize transfer client factory: {:#}", e);
            return;
        }
    };

    let app_state = AppState::new(config, Arc::new(client_factory));

    // Check if running in MCP mode (stdin/stdout) or HTTP server mode
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--mcp") || env::var("MCP_MODE").is_ok() {
        run_mcp_server(app_state).await;
    } else {
        run_http_server(app_state).await;
    }
}
