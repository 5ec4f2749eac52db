// src/ccip/mod.rs

// Chain name resolution and the cross-chain transfer pipeline
pub mod models;
pub mod registry;
pub mod report;
pub mod similarity;
pub mod transfer;

pub use models::*;
pub use registry::{default_registry, ChainRegistry, RegistryError, SUPPORTED_CHAINS};
pub use transfer::{TransferClient, TransferClientFactory, TransferOrchestrator};
