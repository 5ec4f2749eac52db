use axum::{extract::State, Json};
use serde::Serialize;

use crate::{blockchain::networks, AppState};

#[derive(Debug, Serialize)]
pub struct ChainInfo {
    pub chain: String,
    pub aliases: Vec<String>,
    pub chain_id: Option<u64>,
    pub chain_selector: Option<u64>,
    /// Whether an RPC endpoint is configured for this chain
    pub rpc_configured: bool,
}

pub async fn list_chains_handler(State(state): State<AppState>) -> Json<Vec<ChainInfo>> {
    let chains = state
        .registry
        .chain_ids()
        .into_iter()
        .map(|chain| {
            let network = networks::network(chain);
            ChainInfo {
                chain: chain.to_string(),
                aliases: state.registry.aliases(chain).unwrap_or_default().to_vec(),
                chain_id: network.map(|n| n.chain_id),
                chain_selector: network.map(|n| n.chain_selector),
                rpc_configured: state.config.chain_rpc_urls.contains_key(chain),
            }
        })
        .collect();

    Json(chains)
}
