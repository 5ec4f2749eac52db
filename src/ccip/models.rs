// src/ccip/models.rs
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use validator::{Validate, ValidationError};

/// Tokens the CCIP testnet lanes accept for transfers.
pub const SUPPORTED_TOKENS: &[&str] = &["LINK", "CCIP-BnM", "USDC", "CCIP-LnM"];

// --- Request Models ---

/// A transfer exactly as the caller supplied it, before chain resolution.
#[derive(Debug, Clone, Validate)]
pub struct TransferRequest {
    pub sender_chain: String,
    pub receiver_chain: String,
    /// Signing credential, handed to the transfer client and never inspected.
    pub private_key: SecretString,
    #[validate(length(min = 1, message = "token_type must not be empty"))]
    pub token_type: String,
    #[validate(custom = "positive_amount")]
    pub token_amount: f64,
    #[validate(custom = "positive_amount")]
    pub eth_amount: f64,
    #[validate(custom = "positive_amount")]
    pub transfer_amount: f64,
    pub message: String,
}

fn positive_amount(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("amount_must_be_positive"))
    }
}

/// A validated request: both chains resolved to distinct canonical identifiers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferPlan {
    pub sender_chain: String,
    pub receiver_chain: String,
    pub token_type: String,
    pub token_amount: f64,
    pub eth_amount: f64,
    pub transfer_amount: f64,
    pub message: String,
}

// --- Steps ---

/// The eight transfer steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TransferStep {
    DeploySender,
    FundTokens,
    FundGas,
    AllowDestination,
    DeployReceiver,
    AllowSource,
    AllowSender,
    Transfer,
}

impl TransferStep {
    pub const ALL: [TransferStep; 8] = [
        TransferStep::DeploySender,
        TransferStep::FundTokens,
        TransferStep::FundGas,
        TransferStep::AllowDestination,
        TransferStep::DeployReceiver,
        TransferStep::AllowSource,
        TransferStep::AllowSender,
        TransferStep::Transfer,
    ];

    /// 1-based position in the pipeline.
    pub fn index(self) -> u8 {
        match self {
            TransferStep::DeploySender => 1,
            TransferStep::FundTokens => 2,
            TransferStep::FundGas => 3,
            TransferStep::AllowDestination => 4,
            TransferStep::DeployReceiver => 5,
            TransferStep::AllowSource => 6,
            TransferStep::AllowSender => 7,
            TransferStep::Transfer => 8,
        }
    }

    /// What the step does for a given plan, in words.
    pub fn describe(self, plan: &TransferPlan) -> String {
        match self {
            TransferStep::DeploySender => {
                format!("Deploying sender contract on {}", plan.sender_chain)
            }
            TransferStep::FundTokens => format!(
                "Sending {} {} to the sender contract",
                plan.token_amount, plan.token_type
            ),
            TransferStep::FundGas => {
                format!("Sending {} ETH to the sender contract for fees", plan.eth_amount)
            }
            TransferStep::AllowDestination => format!(
                "Allowing destination chain {} on the sender contract",
                plan.receiver_chain
            ),
            TransferStep::DeployReceiver => {
                format!("Deploying receiver contract on {}", plan.receiver_chain)
            }
            TransferStep::AllowSource => format!(
                "Allowing source chain {} on the receiver contract",
                plan.sender_chain
            ),
            TransferStep::AllowSender => {
                "Allowing the sender contract on the receiver contract".to_string()
            }
            TransferStep::Transfer => format!(
                "Transferring {} {} from {} to {}",
                plan.transfer_amount, plan.token_type, plan.sender_chain, plan.receiver_chain
            ),
        }
    }
}

impl fmt::Display for TransferStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}", self.index())
    }
}

// --- Progress ---

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StepStatus {
    /// The capability call was issued and has not returned.
    Attempted,
    /// The call succeeded; holds the contract address or transaction handle.
    Completed(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepRecord {
    pub step: TransferStep,
    pub description: String,
    pub status: StepStatus,
}

impl StepRecord {
    pub fn index(&self) -> u8 {
        self.step.index()
    }

    pub fn artifact(&self) -> Option<&str> {
        match &self.status {
            StepStatus::Completed(artifact) => Some(artifact),
            _ => None,
        }
    }
}

/// Append-only log of the steps attempted in one run.
///
/// A record is appended when its step is attempted, so a run that fails at
/// step `k` leaves exactly `k` records behind.
#[derive(Debug, Clone, Serialize)]
pub struct TransferProgress {
    pub started_at: DateTime<Utc>,
    records: Vec<StepRecord>,
}

impl TransferProgress {
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            records: Vec::new(),
        }
    }

    pub(crate) fn begin(&mut self, step: TransferStep, description: String) {
        self.records.push(StepRecord {
            step,
            description,
            status: StepStatus::Attempted,
        });
    }

    pub(crate) fn finish(&mut self, status: StepStatus) {
        if let Some(last) = self.records.last_mut() {
            last.status = status;
        }
    }

    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Artifact produced by `step`, if it completed.
    pub fn artifact(&self, step: TransferStep) -> Option<&str> {
        self.records
            .iter()
            .find(|r| r.step == step)
            .and_then(StepRecord::artifact)
    }

    /// Steps whose on-chain effect already happened.
    pub fn completed(&self) -> impl Iterator<Item = &StepRecord> {
        self.records.iter().filter(|r| r.artifact().is_some())
    }
}

impl Default for TransferProgress {
    fn default() -> Self {
        Self::new()
    }
}

// --- Outcome & Errors ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ChainSide {
    Sender,
    Receiver,
}

impl fmt::Display for ChainSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainSide::Sender => write!(f, "sender"),
            ChainSide::Receiver => write!(f, "receiver"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransferError {
    #[error("invalid transfer request: {0}")]
    InvalidRequest(String),
    #[error("invalid {side} chain '{input}'")]
    UnresolvedChain { side: ChainSide, input: String },
    #[error("sender and receiver chains must be different (both resolved to {chain})")]
    SameChain { chain: String },
    #[error("could not set up the transfer client: {0}")]
    ClientSetup(String),
    #[error("{step} failed: {cause}")]
    StepFailure { step: TransferStep, cause: String },
    #[error("unknown tool: {0}")]
    UnknownOperation(String),
}

impl TransferError {
    /// Index of the failed step; `None` for failures before any step ran.
    pub fn failed_at_step(&self) -> Option<u8> {
        match self {
            TransferError::StepFailure { step, .. } => Some(step.index()),
            _ => None,
        }
    }

    /// The underlying cause, verbatim for step failures.
    pub fn cause(&self) -> String {
        match self {
            TransferError::StepFailure { cause, .. } => cause.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferReceipt {
    pub sender_contract: String,
    pub receiver_contract: String,
    /// Tracking handle returned by the final transfer call.
    pub transfer_handle: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TransferOutcome {
    Success(TransferReceipt),
    Failure(TransferError),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success(_))
    }

    pub fn failed_at_step(&self) -> Option<u8> {
        match self {
            TransferOutcome::Failure(err) => err.failed_at_step(),
            TransferOutcome::Success(_) => None,
        }
    }
}

/// Everything one orchestration run produced. Not retained after the call.
#[derive(Debug, Clone)]
pub struct TransferRun {
    /// `None` when validation rejected the request.
    pub plan: Option<TransferPlan>,
    pub progress: TransferProgress,
    pub outcome: TransferOutcome,
}
