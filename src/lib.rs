// src/lib.rs

use std::sync::Arc;

// Re-export modules
pub mod api;
pub mod blockchain;
pub mod ccip;
pub mod config;
pub mod mcp;
pub mod mocks;
pub mod utils;

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: config::Config,
    /// Chain alias table used by both tools
    pub registry: &'static ccip::ChainRegistry,
    /// Builds a transfer client from the caller's credential, once per call
    pub client_factory: Arc<dyn ccip::TransferClientFactory>,
}

impl AppState {
    pub fn new(config: config::Config, client_factory: Arc<dyn ccip::TransferClientFactory>) -> Self {
        Self {
            config,
            registry: ccip::default_registry(),
            client_factory,
        }
    }
}
