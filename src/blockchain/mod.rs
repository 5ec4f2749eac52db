// src/blockchain/mod.rs

// ethers-backed implementation of the CCIP transfer client
pub mod artifacts;
pub mod evm_client;
pub mod networks;

pub use evm_client::{EvmClientFactory, EvmTransferClient};
pub use networks::{network, CcipNetwork, CCIP_NETWORKS};
