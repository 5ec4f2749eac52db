//! # API Module
//!
//! HTTP endpoints for the CCIP MCP server.
//!
//! ## Available Endpoints
//!
//! - `GET /api/health` - Liveness check
//! - `GET /api/chains` - Supported chains with their aliases and CCIP selectors
//! - `POST /api/rpc` - JSON-RPC endpoint for MCP tool calls

pub mod chains;
pub mod health;
pub mod rpc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

/// Builds the full application router, with every route nested under `/api`.
pub fn create_router(state: AppState) -> Router {
    let api_router = Router::new()
        .route("/health", get(health::health_handler))
        .route("/chains", get(chains::list_chains_handler))
        .route("/rpc", post(rpc::rpc_handler));

    Router::new()
        .nest("/api", api_router)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
