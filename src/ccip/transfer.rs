//! # Transfer Orchestrator
//!
//! Runs the eight CCIP transfer steps against a [`TransferClient`], strictly in
//! order, each awaited before the next begins.
//!
//! The pipeline is non-transactional: the first failing step ends the run and
//! nothing that already happened on-chain is undone. Contracts deployed and
//! funds sent by earlier steps stay where they are, and the failure report
//! lists them so the caller can recover them by hand. No step is retried.

use anyhow::Result;
use async_trait::async_trait;
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use super::models::{
    ChainSide, StepStatus, TransferError, TransferOutcome, TransferPlan, TransferProgress,
    TransferReceipt, TransferRequest, TransferRun, TransferStep,
};
use super::registry::ChainRegistry;

/// On-chain operations the orchestrator drives. Every call is an irreversible
/// transaction; the returned string is an opaque artifact (contract address,
/// transaction hash or tracking URL).
#[async_trait]
pub trait TransferClient: Send + Sync {
    async fn deploy_sender_contract(&self, chain: &str) -> Result<String>;

    async fn send_tokens_to_sender_contract(
        &self,
        chain: &str,
        token_type: &str,
        amount: f64,
    ) -> Result<String>;

    async fn send_eth_to_contract(&self, chain: &str, amount: f64) -> Result<String>;

    async fn allow_destination_chain(
        &self,
        current_chain: &str,
        destination_chain: &str,
    ) -> Result<String>;

    async fn deploy_receiver_contract(&self, chain: &str) -> Result<String>;

    async fn allow_source_chain(&self, current_chain: &str, sender_chain: &str) -> Result<String>;

    async fn allow_sender_on_receiver(
        &self,
        sender_chain: &str,
        receiver_chain: &str,
    ) -> Result<String>;

    /// Sends the cross-chain message and returns a handle to track it.
    async fn transfer(
        &self,
        sender_chain: &str,
        receiver_chain: &str,
        message: &str,
        amount: f64,
    ) -> Result<String>;
}

/// Builds a [`TransferClient`] bound to one signing credential.
pub trait TransferClientFactory: Send + Sync {
    fn connect(&self, credential: &SecretString) -> Result<Arc<dyn TransferClient>>;
}

pub struct TransferOrchestrator<'r> {
    registry: &'r ChainRegistry,
}

impl<'r> TransferOrchestrator<'r> {
    pub fn new(registry: &'r ChainRegistry) -> Self {
        Self { registry }
    }

    /// Validates a request without touching the chain.
    ///
    /// Checks run in order and stop at the first failure: sender resolution,
    /// receiver resolution, distinct chains, then argument sanity.
    pub fn plan(&self, request: &TransferRequest) -> Result<TransferPlan, TransferError> {
        let sender = self.registry.resolve(&request.sender_chain).ok_or_else(|| {
            TransferError::UnresolvedChain {
                side: ChainSide::Sender,
                input: request.sender_chain.clone(),
            }
        })?;
        let receiver = self.registry.resolve(&request.receiver_chain).ok_or_else(|| {
            TransferError::UnresolvedChain {
                side: ChainSide::Receiver,
                input: request.receiver_chain.clone(),
            }
        })?;
        if sender == receiver {
            return Err(TransferError::SameChain {
                chain: sender.to_string(),
            });
        }
        request
            .validate()
            .map_err(|e| TransferError::InvalidRequest(e.to_string()))?;

        Ok(TransferPlan {
            sender_chain: sender.to_string(),
            receiver_chain: receiver.to_string(),
            token_type: request.token_type.clone(),
            token_amount: request.token_amount,
            eth_amount: request.eth_amount,
            transfer_amount: request.transfer_amount,
            message: request.message.clone(),
        })
    }

    /// Validates and, if the request is sound, runs all eight steps.
    pub async fn execute(&self, request: &TransferRequest, client: &dyn TransferClient) -> TransferRun {
        match self.plan(request) {
            Ok(plan) => run(plan, client).await,
            Err(err) => rejected(None, err),
        }
    }
}

/// Run that ended before any step was attempted.
pub fn rejected(plan: Option<TransferPlan>, err: TransferError) -> TransferRun {
    warn!("Transfer rejected before execution: {}", err);
    TransferRun {
        plan,
        progress: TransferProgress::new(),
        outcome: TransferOutcome::Failure(err),
    }
}

/// Executes a validated plan step by step, halting on the first failure.
pub async fn run(plan: TransferPlan, client: &dyn TransferClient) -> TransferRun {
    let mut progress = TransferProgress::new();
    info!(
        "Starting CCIP transfer {} -> {} ({} {})",
        plan.sender_chain, plan.receiver_chain, plan.transfer_amount, plan.token_type
    );

    for step in TransferStep::ALL {
        let description = step.describe(&plan);
        info!("Step {}/8: {}", step.index(), description);
        progress.begin(step, description);

        match invoke(step, &plan, client).await {
            Ok(artifact) => {
                info!("Step {}/8 done: {}", step.index(), artifact);
                progress.finish(StepStatus::Completed(artifact));
            }
            Err(e) => {
                let cause = format!("{:#}", e);
                error!("Step {}/8 failed: {}", step.index(), cause);
                progress.finish(StepStatus::Failed(cause.clone()));
                if progress.completed().next().is_some() {
                    warn!(
                        "Steps 1-{} already executed on-chain and are not rolled back",
                        step.index() - 1
                    );
                }
                return TransferRun {
                    plan: Some(plan),
                    progress,
                    outcome: TransferOutcome::Failure(TransferError::StepFailure { step, cause }),
                };
            }
        }
    }

    let receipt = TransferReceipt {
        sender_contract: progress
            .artifact(TransferStep::DeploySender)
            .unwrap_or_default()
            .to_string(),
        receiver_contract: progress
            .artifact(TransferStep::DeployReceiver)
            .unwrap_or_default()
            .to_string(),
        transfer_handle: progress
            .artifact(TransferStep::Transfer)
            .unwrap_or_default()
            .to_string(),
    };
    info!("CCIP transfer submitted: {}", receipt.transfer_handle);

    TransferRun {
        plan: Some(plan),
        progress,
        outcome: TransferOutcome::Success(receipt),
    }
}

async fn invoke(step: TransferStep, plan: &TransferPlan, client: &dyn TransferClient) -> Result<String> {
    let sender = plan.sender_chain.as_str();
    let receiver = plan.receiver_chain.as_str();

    match step {
        TransferStep::DeploySender => client.deploy_sender_contract(sender).await,
        TransferStep::FundTokens => {
            client
                .send_tokens_to_sender_contract(sender, &plan.token_type, plan.token_amount)
                .await
        }
        TransferStep::FundGas => client.send_eth_to_contract(sender, plan.eth_amount).await,
        TransferStep::AllowDestination => client.allow_destination_chain(sender, receiver).await,
        TransferStep::DeployReceiver => client.deploy_receiver_contract(receiver).await,
        TransferStep::AllowSource => client.allow_source_chain(receiver, sender).await,
        TransferStep::AllowSender => client.allow_sender_on_receiver(sender, receiver).await,
        TransferStep::Transfer => {
            client
                .transfer(sender, receiver, &plan.message, plan.transfer_amount)
                .await
        }
    }
}
