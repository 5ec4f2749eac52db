// src/config.rs

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::env;
use std::str::FromStr;

/// Parameter values applied when a transfer call leaves them out.
#[derive(Clone, Debug, PartialEq)]
pub struct TransferDefaults {
    pub token_type: String,
    pub token_amount: f64,
    pub eth_amount: f64,
    pub transfer_amount: f64,
    pub message: String,
}

impl Default for TransferDefaults {
    fn default() -> Self {
        Self {
            token_type: "CCIP-BnM".to_string(),
            token_amount: 0.1,
            eth_amount: 0.05,
            transfer_amount: 0.069,
            message: "Cross-chain transfer via MCP".to_string(),
        }
    }
}

// A struct to hold all configuration, loaded once at startup from the .env file.
#[derive(Clone, Debug)]
pub struct Config {
    // Server settings
    pub port: u16,

    /// RPC endpoint per canonical chain identifier, e.g.
    /// `{"ethereum_sepolia": "https://...", "avalanche_fuji": "https://..."}`
    pub chain_rpc_urls: HashMap<String, String>,

    // Contract artifacts (Foundry or Hardhat JSON)
    pub sender_artifact_path: Option<String>,
    pub receiver_artifact_path: Option<String>,

    /// Base URL for message tracking links
    pub explorer_url: String,

    pub transfer_defaults: TransferDefaults,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            chain_rpc_urls: HashMap::new(),
            sender_artifact_path: None,
            receiver_artifact_path: None,
            explorer_url: "https://ccip.chain.link/msg".to_string(),
            transfer_defaults: TransferDefaults::default(),
        }
    }
}

impl Config {
    /// Canonical chains that have an RPC endpoint configured
    pub fn configured_chains(&self) -> Vec<String> {
        let mut chains: Vec<String> = self.chain_rpc_urls.keys().cloned().collect();
        chains.sort();
        chains
    }

    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        // Load variables from the .env file into the environment
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base = Self::default();
        let defaults = base.transfer_defaults.clone();

        let chain_rpc_urls = match lookup("CHAIN_RPC_URLS") {
            Some(raw) => serde_json::from_str(&raw)
                .context("CHAIN_RPC_URLS must be a JSON map of chain name -> RPC URL")?,
            None => HashMap::new(),
        };

        Ok(Config {
            port: parse_or(&lookup, "PORT", base.port)?,
            chain_rpc_urls,
            sender_artifact_path: lookup("SENDER_CONTRACT_ARTIFACT"),
            receiver_artifact_path: lookup("RECEIVER_CONTRACT_ARTIFACT"),
            explorer_url: lookup("CCIP_EXPLORER_URL").unwrap_or(base.explorer_url),
            transfer_defaults: TransferDefaults {
                token_type: lookup("DEFAULT_TOKEN_TYPE").unwrap_or(defaults.token_type),
                token_amount: parse_or(&lookup, "DEFAULT_TOKEN_AMOUNT", defaults.token_amount)?,
                eth_amount: parse_or(&lookup, "DEFAULT_ETH_AMOUNT", defaults.eth_amount)?,
                transfer_amount: parse_or(
                    &lookup,
                    "DEFAULT_TRANSFER_AMOUNT",
                    defaults.transfer_amount,
                )?,
                message: lookup("DEFAULT_TRANSFER_MESSAGE").unwrap_or(defaults.message),
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid number", key)),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert_eq!(config.port, 8080);
        assert!(config.chain_rpc_urls.is_empty());
        assert_eq!(config.transfer_defaults, TransferDefaults::default());
        assert_eq!(config.transfer_defaults.token_type, "CCIP-BnM");
    }

    #[test]
    fn reads_rpc_map_and_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "9090"),
            (
                "CHAIN_RPC_URLS",
                r#"{"base_sepolia": "https://base.example", "avalanche_fuji": "https://fuji.example"}"#,
            ),
            ("DEFAULT_TOKEN_TYPE", "LINK"),
            ("DEFAULT_TRANSFER_AMOUNT", "0.5"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.configured_chains(), vec!["avalanche_fuji", "base_sepolia"]);
        assert_eq!(config.transfer_defaults.token_type, "LINK");
        assert_eq!(config.transfer_defaults.transfer_amount, 0.5);
        assert_eq!(config.transfer_defaults.eth_amount, 0.05);
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(Config::from_lookup(lookup_from(&[("PORT", "eighty")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("CHAIN_RPC_URLS", "[1,2]")])).is_err());
    }
}
