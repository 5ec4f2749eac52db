// src/blockchain/networks.rs

use anyhow::{anyhow, Result};
use ethers::types::Address;

/// ERC-20 token deployed on a CCIP testnet.
#[derive(Debug, Clone, Copy)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub address: &'static str,
    pub decimals: u8,
}

/// Static CCIP parameters for one canonical chain.
#[derive(Debug, Clone, Copy)]
pub struct CcipNetwork {
    pub chain: &'static str,
    pub chain_id: u64,
    /// CCIP chain selector used to address this chain from other chains
    pub chain_selector: u64,
    pub router: &'static str,
    pub link_token: &'static str,
    pub tokens: &'static [TokenInfo],
}

impl CcipNetwork {
    pub fn router_address(&self) -> Result<Address> {
        parse_address(self.router, "router")
    }

    pub fn link_address(&self) -> Result<Address> {
        parse_address(self.link_token, "LINK token")
    }

    /// Token lookup by symbol, ignoring case.
    pub fn token(&self, symbol: &str) -> Option<&'static TokenInfo> {
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol.trim()))
    }
}

pub fn parse_address(value: &str, what: &str) -> Result<Address> {
    value
        .parse::<Address>()
        .map_err(|e| anyhow!("Invalid {} address '{}': {}", what, value, e))
}

pub const CCIP_NETWORKS: &[CcipNetwork] = &[
    CcipNetwork {
        chain: "ethereum_sepolia",
        chain_id: 11155111,
        chain_selector: 16015286601757825753,
        router: "0x0BF3dE8c5D3e8A2B34D2BEeB17ABfCeBaf363A59",
        link_token: "0x779877A7B0D9E8603169DdbD7836e478b4624789",
        tokens: &[
            TokenInfo { symbol: "LINK", address: "0x779877A7B0D9E8603169DdbD7836e478b4624789", decimals: 18 },
            TokenInfo { symbol: "CCIP-BnM", address: "0xFd57b4ddBf88a4e07fF4e34C487b99af2Fe82a05", decimals: 18 },
            TokenInfo { symbol: "CCIP-LnM", address: "0x466D489b6d36E7E3b824ef491C225F5830E81cC1", decimals: 18 },
            TokenInfo { symbol: "USDC", address: "0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238", decimals: 6 },
        ],
    },
    CcipNetwork {
        chain: "base_sepolia",
        chain_id: 84532,
        chain_selector: 10344971235874465080,
        router: "0xD3b06cEbF099CE7DA4AcCf578aaebFDBd6e88a93",
        link_token: "0xE4aB69C077896252FAFBD49EFD26B5D171A32410",
        tokens: &[
            TokenInfo { symbol: "LINK", address: "0xE4aB69C077896252FAFBD49EFD26B5D171A32410", decimals: 18 },
            TokenInfo { symbol: "CCIP-BnM", address: "0x88A2d74F47a237a62e7A51cdDa67270CE381555e", decimals: 18 },
            TokenInfo { symbol: "USDC", address: "0x036CbD53842c5426634e7929541eC2318f3dCF7e", decimals: 6 },
        ],
    },
    CcipNetwork {
        chain: "arbitrum_sepolia",
        chain_id: 421614,
        chain_selector: 3478487238524512106,
        router: "0x2a9C5afB0d0e4BAb2BCdaE109EC4b0c4Be15a165",
        link_token: "0xb1D4538B4571d411F07960EF2838Ce337FE1E80E",
        tokens: &[
            TokenInfo { symbol: "LINK", address: "0xb1D4538B4571d411F07960EF2838Ce337FE1E80E", decimals: 18 },
            TokenInfo { symbol: "CCIP-BnM", address: "0xA8C0c11bf64AF62CDCA6f93D3769B88BdD7cb93D", decimals: 18 },
            TokenInfo { symbol: "USDC", address: "0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d", decimals: 6 },
        ],
    },
    CcipNetwork {
        chain: "avalanche_fuji",
        chain_id: 43113,
        chain_selector: 14767482510784806043,
        router: "0xF694E193200268f9a4868e4Aa017A0118C9a8177",
        link_token: "0x0b9d5D9136855f6FEc3c0993feE6E9CE8a297846",
        tokens: &[
            TokenInfo { symbol: "LINK", address: "0x0b9d5D9136855f6FEc3c0993feE6E9CE8a297846", decimals: 18 },
            TokenInfo { symbol: "CCIP-BnM", address: "0xD21341536c5cF5EB1bcb58f6723cE26e8D8E90e4", decimals: 18 },
            TokenInfo { symbol: "USDC", address: "0x5425890298aed601595a70AB815c96711a31Bc65", decimals: 6 },
        ],
    },
];

/// Network profile for a canonical chain identifier.
pub fn network(chain: &str) -> Option<&'static CcipNetwork> {
    CCIP_NETWORKS.iter().find(|n| n.chain == chain)
}
