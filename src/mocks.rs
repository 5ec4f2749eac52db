//! Deterministic transfer client for tests and demos
//!
//! `MockTransferClient` never touches a network. It records every call in
//! order, returns fixed artifacts, and can be told to fail at one step.

use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::ccip::{
    transfer::{TransferClient, TransferClientFactory},
    TransferStep,
};

pub const MOCK_SENDER_CONTRACT: &str = "0x5E4DE45e3b4f2C1a6D0a3C0F2b8E1e5D4C3B2A10";
pub const MOCK_RECEIVER_CONTRACT: &str = "0x7AcE1d2e3F405162738495a6B7c8D9e0F1a2B3C4";
pub const MOCK_TRACKING_URL: &str = "https://ccip.chain.link/msg/0x00000000000000000000000000000000000000000000000000000000000000aa";

/// One recorded capability call.
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    pub step: TransferStep,
    pub args: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MockTransferClient {
    calls: Mutex<Vec<MockCall>>,
    failure: Option<(TransferStep, String)>,
}

impl MockTransferClient {
    /// A client on which every step succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose `step` call fails with `cause`.
    pub fn failing_at(step: TransferStep, cause: &str) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            failure: Some((step, cause.to_string())),
        }
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn steps_called(&self) -> Vec<TransferStep> {
        self.calls().into_iter().map(|c| c.step).collect()
    }

    /// Transaction hash the mock reports for a non-deploy step.
    pub fn tx_hash(step: TransferStep) -> String {
        format!("0x{:064x}", step.index())
    }

    fn record(&self, step: TransferStep, args: &[&str]) -> Result<()> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                step,
                args: args.iter().map(|a| a.to_string()).collect(),
            });
        }
        match &self.failure {
            Some((failing, cause)) if *failing == step => Err(anyhow!("{}", cause)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl TransferClient for MockTransferClient {
    async fn deploy_sender_contract(&self, chain: &str) -> Result<String> {
        self.record(TransferStep::DeploySender, &[chain])?;
        Ok(MOCK_SENDER_CONTRACT.to_string())
    }

    async fn send_tokens_to_sender_contract(
        &self,
        chain: &str,
        token_type: &str,
        amount: f64,
    ) -> Result<String> {
        let amount = amount.to_string();
        self.record(TransferStep::FundTokens, &[chain, token_type, &amount])?;
        Ok(Self::tx_hash(TransferStep::FundTokens))
    }

    async fn send_eth_to_contract(&self, chain: &str, amount: f64) -> Result<String> {
        let amount = amount.to_string();
        self.record(TransferStep::FundGas, &[chain, &amount])?;
        Ok(Self::tx_hash(TransferStep::FundGas))
    }

    async fn allow_destination_chain(
        &self,
        current_chain: &str,
        destination_chain: &str,
    ) -> Result<String> {
        self.record(TransferStep::AllowDestination, &[current_chain, destination_chain])?;
        Ok(Self::tx_hash(TransferStep::AllowDestination))
    }

    async fn deploy_receiver_contract(&self, chain: &str) -> Result<String> {
        self.record(TransferStep::DeployReceiver, &[chain])?;
        Ok(MOCK_RECEIVER_CONTRACT.to_string())
    }

    async fn allow_source_chain(&self, current_chain: &str, sender_chain: &str) -> Result<String> {
        self.record(TransferStep::AllowSource, &[current_chain, sender_chain])?;
        Ok(Self::tx_hash(TransferStep::AllowSource))
    }

    async fn allow_sender_on_receiver(
        &self,
        sender_chain: &str,
        receiver_chain: &str,
    ) -> Result<String> {
        self.record(TransferStep::AllowSender, &[sender_chain, receiver_chain])?;
        Ok(Self::tx_hash(TransferStep::AllowSender))
    }

    async fn transfer(
        &self,
        sender_chain: &str,
        receiver_chain: &str,
        message: &str,
        amount: f64,
    ) -> Result<String> {
        let amount = amount.to_string();
        self.record(
            TransferStep::Transfer,
            &[sender_chain, receiver_chain, message, &amount],
        )?;
        Ok(MOCK_TRACKING_URL.to_string())
    }
}

/// Hands out one shared [`MockTransferClient`] and counts connections.
#[derive(Debug, Clone)]
pub struct MockClientFactory {
    pub client: Arc<MockTransferClient>,
    connections: Arc<Mutex<usize>>,
    reject_credential: Option<String>,
}

impl MockClientFactory {
    pub fn new(client: MockTransferClient) -> Self {
        Self {
            client: Arc::new(client),
            connections: Arc::new(Mutex::new(0)),
            reject_credential: None,
        }
    }

    /// Refuses to connect when the credential equals `credential`.
    pub fn rejecting(mut self, credential: &str) -> Self {
        self.reject_credential = Some(credential.to_string());
        self
    }

    pub fn connections(&self) -> usize {
        self.connections.lock().map(|c| *c).unwrap_or_default()
    }
}

impl TransferClientFactory for MockClientFactory {
    fn connect(&self, credential: &SecretString) -> Result<Arc<dyn TransferClient>> {
        if let Ok(mut count) = self.connections.lock() {
            *count += 1;
        }
        if self.reject_credential.as_deref() == Some(credential.expose_secret().as_str()) {
            return Err(anyhow!("Invalid private key"));
        }
        Ok(self.client.clone())
    }
}
