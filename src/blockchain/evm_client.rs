// src/blockchain/evm_client.rs

use crate::{
    blockchain::{
        artifacts::{CcipArtifacts, ContractArtifact},
        networks::{self, CcipNetwork},
    },
    ccip::transfer::{TransferClient, TransferClientFactory},
    config::Config,
};
use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use dashmap::DashMap;
use ethers::middleware::SignerMiddleware;
use ethers_contract::{Contract, ContractCall, ContractFactory};
use ethers_core::abi::{encode, Detokenize, Token, Tokenize};
use ethers_core::types::{Address, Bytes, TransactionReceipt, TransactionRequest, H256, U256, U64};
use ethers_core::utils::{keccak256, parse_ether, parse_units, to_checksum};
use ethers_providers::{Http, Middleware, Provider};
use ethers_signers::{LocalWallet, Signer};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};

type SignerClient = SignerMiddleware<Provider<Http>, LocalWallet>;

/// Builds one [`EvmTransferClient`] per invocation from the caller's key.
#[derive(Clone)]
pub struct EvmClientFactory {
    providers: HashMap<String, Provider<Http>>,
    artifacts: Option<Arc<CcipArtifacts>>,
    explorer_url: String,
}

impl EvmClientFactory {
    pub fn from_config(config: &Config) -> Result<Self> {
        let mut providers = HashMap::new();
        for (chain, url) in &config.chain_rpc_urls {
            match Provider::<Http>::try_from(url.as_str()) {
                Ok(provider) => {
                    providers.insert(chain.clone(), provider);
                }
                Err(e) => warn!("Failed to create provider for chain {} at {}: {}", chain, url, e),
            }
        }

        let artifacts = match (&config.sender_artifact_path, &config.receiver_artifact_path) {
            (Some(sender), Some(receiver)) => {
                let sender = ContractArtifact::load(Path::new(sender))
                    .context("Failed to load sender contract artifact")?;
                let receiver = ContractArtifact::load(Path::new(receiver))
                    .context("Failed to load receiver contract artifact")?;
                Some(Arc::new(CcipArtifacts { sender, receiver }))
            }
            _ => {
                warn!("Contract artifacts not configured; transfers will be rejected");
                None
            }
        };

        Ok(Self {
            providers,
            artifacts,
            explorer_url: config.explorer_url.clone(),
        })
    }
}

impl TransferClientFactory for EvmClientFactory {
    fn connect(&self, credential: &SecretString) -> Result<Arc<dyn TransferClient>> {
        let artifacts = self.artifacts.clone().ok_or_else(|| {
            anyhow!("SENDER_CONTRACT_ARTIFACT and RECEIVER_CONTRACT_ARTIFACT must be configured")
        })?;
        // Parse errors can echo key material and are not forwarded.
        let wallet = LocalWallet::from_str(credential.expose_secret().trim())
            .map_err(|_| anyhow!("Invalid private key"))?;
        info!("Transfer client ready for {}", to_checksum(&wallet.address(), None));

        Ok(Arc::new(EvmTransferClient {
            wallet,
            providers: self.providers.clone(),
            artifacts,
            explorer_url: self.explorer_url.clone(),
            senders: DashMap::new(),
            receivers: DashMap::new(),
            funded_tokens: DashMap::new(),
        }))
    }
}

/// CCIP transfer client signing with a single wallet across all chains.
///
/// Remembers the contracts it deployed and the token it funded, keyed by
/// canonical chain, so later steps can address them.
pub struct EvmTransferClient {
    wallet: LocalWallet,
    providers: HashMap<String, Provider<Http>>,
    artifacts: Arc<CcipArtifacts>,
    explorer_url: String,
    senders: DashMap<String, Address>,
    receivers: DashMap<String, Address>,
    funded_tokens: DashMap<String, (Address, u8)>,
}

impl EvmTransferClient {
    fn signer(&self, chain: &str) -> Result<(Arc<SignerClient>, &'static CcipNetwork)> {
        let network = networks::network(chain)
            .ok_or_else(|| anyhow!("No CCIP network profile for chain: {}", chain))?;
        let provider = self
            .providers
            .get(chain)
            .cloned()
            .ok_or_else(|| anyhow!("No RPC URL configured for chain: {}", chain))?;
        let wallet = self.wallet.clone().with_chain_id(network.chain_id);
        Ok((Arc::new(SignerMiddleware::new(provider, wallet)), network))
    }

    fn selector(chain: &str) -> Result<u64> {
        networks::network(chain)
            .map(|n| n.chain_selector)
            .ok_or_else(|| anyhow!("No CCIP network profile for chain: {}", chain))
    }
}

async fn deploy_contract<T: Tokenize + Send>(
    chain: &str,
    artifact: &ContractArtifact,
    client: Arc<SignerClient>,
    constructor_args: T,
) -> Result<Address> {
    let factory = ContractFactory::new(artifact.abi.clone(), artifact.bytecode.clone(), client);
    let contract = factory
        .deploy(constructor_args)
        .map_err(|e| anyhow!("Failed to encode constructor arguments: {}", e))?
        .send()
        .await
        .map_err(|e| anyhow!("Contract deployment on {} failed: {}", chain, e))?;
    Ok(contract.address())
}

fn deployed(map: &DashMap<String, Address>, chain: &str, role: &str) -> Result<Address> {
    map.get(chain)
        .map(|entry| *entry.value())
        .ok_or_else(|| anyhow!("No {} contract deployed on {} by this client", role, chain))
}

fn to_units(amount: f64, decimals: u8) -> Result<U256> {
    parse_units(amount.to_string(), decimals as u32)
        .map(U256::from)
        .map_err(|e| anyhow!("Invalid amount {}: {}", amount, e))
}

fn encode_call(sig: &str, tokens: Vec<Token>) -> Bytes {
    let mut out = keccak256(sig.as_bytes())[0..4].to_vec();
    out.extend(encode(&tokens));
    Bytes::from(out)
}

fn erc20_transfer_tx(token: Address, to: Address, amount: U256) -> TransactionRequest {
    let data = encode_call(
        "transfer(address,uint256)",
        vec![Token::Address(to), Token::Uint(amount)],
    );
    TransactionRequest::new().to(token).data(data)
}

fn check_receipt(receipt: Option<TransactionReceipt>, label: &str) -> Result<String> {
    let receipt = receipt.ok_or_else(|| anyhow!("{} transaction was dropped from the mempool", label))?;
    if receipt.status != Some(U64::from(1)) {
        bail!("{} transaction {:?} reverted", label, receipt.transaction_hash);
    }
    Ok(format!("{:?}", receipt.transaction_hash))
}

async fn submit(client: &SignerClient, tx: TransactionRequest, label: &str) -> Result<String> {
    let pending = client
        .send_transaction(tx, None)
        .await
        .map_err(|e| anyhow!("{} rejected: {}", label, e))?;
    let receipt = pending
        .await
        .map_err(|e| anyhow!("{} confirmation failed: {}", label, e))?;
    check_receipt(receipt, label)
}

async fn confirm<D>(call: ContractCall<SignerClient, D>, label: &str) -> Result<String>
where
    D: Detokenize + Send + Sync,
{
    let pending = call
        .send()
        .await
        .map_err(|e| anyhow!("{} rejected: {}", label, e))?;
    let receipt = pending
        .await
        .map_err(|e| anyhow!("{} confirmation failed: {}", label, e))?;
    check_receipt(receipt, label)
}

#[async_trait]
impl TransferClient for EvmTransferClient {
    async fn deploy_sender_contract(&self, chain: &str) -> Result<String> {
        let (client, network) = self.signer(chain)?;
        let args = (network.router_address()?, network.link_address()?);
        let address = deploy_contract(chain, &self.artifacts.sender, client, args).await?;
        self.senders.insert(chain.to_string(), address);
        Ok(to_checksum(&address, None))
    }

    async fn send_tokens_to_sender_contract(
        &self,
        chain: &str,
        token_type: &str,
        amount: f64,
    ) -> Result<String> {
        let (client, network) = self.signer(chain)?;
        let token = network
            .token(token_type)
            .ok_or_else(|| anyhow!("Token {} is not available on {}", token_type, chain))?;
        let token_address = networks::parse_address(token.address, token.symbol)?;
        let sender = deployed(&self.senders, chain, "sender")?;

        let tx = erc20_transfer_tx(token_address, sender, to_units(amount, token.decimals)?);
        let hash = submit(&client, tx, "Token funding").await?;
        self.funded_tokens
            .insert(chain.to_string(), (token_address, token.decimals));
        Ok(hash)
    }

    async fn send_eth_to_contract(&self, chain: &str, amount: f64) -> Result<String> {
        let (client, _) = self.signer(chain)?;
        let sender = deployed(&self.senders, chain, "sender")?;
        let value = parse_ether(amount).map_err(|e| anyhow!("Invalid ETH amount {}: {}", amount, e))?;
        let tx = TransactionRequest::new().to(sender).value(value);
        submit(&client, tx, "Gas funding").await
    }

    async fn allow_destination_chain(
        &self,
        current_chain: &str,
        destination_chain: &str,
    ) -> Result<String> {
        let (client, _) = self.signer(current_chain)?;
        let sender = deployed(&self.senders, current_chain, "sender")?;
        let contract = Contract::new(sender, self.artifacts.sender.abi.clone(), client);
        let call = contract.method::<_, ()>(
            "allowlistDestinationChain",
            (Self::selector(destination_chain)?, true),
        )?;
        confirm(call, "allowlistDestinationChain").await
    }

    async fn deploy_receiver_contract(&self, chain: &str) -> Result<String> {
        let (client, network) = self.signer(chain)?;
        let router = network.router_address()?;
        let address = deploy_contract(chain, &self.artifacts.receiver, client, router).await?;
        self.receivers.insert(chain.to_string(), address);
        Ok(to_checksum(&address, None))
    }

    async fn allow_source_chain(&self, current_chain: &str, sender_chain: &str) -> Result<String> {
        let (client, _) = self.signer(current_chain)?;
        let receiver = deployed(&self.receivers, current_chain, "receiver")?;
        let contract = Contract::new(receiver, self.artifacts.receiver.abi.clone(), client);
        let call = contract.method::<_, ()>(
            "allowlistSourceChain",
            (Self::selector(sender_chain)?, true),
        )?;
        confirm(call, "allowlistSourceChain").await
    }

    async fn allow_sender_on_receiver(
        &self,
        sender_chain: &str,
        receiver_chain: &str,
    ) -> Result<String> {
        let (client, _) = self.signer(receiver_chain)?;
        let sender = deployed(&self.senders, sender_chain, "sender")?;
        let receiver = deployed(&self.receivers, receiver_chain, "receiver")?;
        let contract = Contract::new(receiver, self.artifacts.receiver.abi.clone(), client);
        let call = contract.method::<_, ()>("allowlistSender", (sender, true))?;
        confirm(call, "allowlistSender").await
    }

    async fn transfer(
        &self,
        sender_chain: &str,
        receiver_chain: &str,
        message: &str,
        amount: f64,
    ) -> Result<String> {
        let (client, _) = self.signer(sender_chain)?;
        let sender = deployed(&self.senders, sender_chain, "sender")?;
        let receiver = deployed(&self.receivers, receiver_chain, "receiver")?;
        let (token, decimals) = self
            .funded_tokens
            .get(sender_chain)
            .map(|entry| *entry.value())
            .ok_or_else(|| anyhow!("Sender contract on {} was never funded with tokens", sender_chain))?;

        let contract = Contract::new(sender, self.artifacts.sender.abi.clone(), client);
        let call = contract.method::<_, H256>(
            "sendMessagePayNative",
            (
                Self::selector(receiver_chain)?,
                receiver,
                message.to_string(),
                token,
                to_units(amount, decimals)?,
            ),
        )?;
        // Simulate first to learn the message id the router will assign.
        let message_id = call
            .call()
            .await
            .map_err(|e| anyhow!("sendMessagePayNative simulation failed: {}", e))?;
        confirm(call, "sendMessagePayNative").await?;

        Ok(format!(
            "{}/{:?}",
            self.explorer_url.trim_end_matches('/'),
            message_id
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_decimal_amounts_to_token_units() {
        assert_eq!(to_units(0.1, 18).unwrap(), U256::from(100_000_000_000_000_000u64));
        assert_eq!(to_units(0.069, 6).unwrap(), U256::from(69_000u64));
    }

    #[test]
    fn erc20_transfer_uses_standard_selector() {
        let tx = erc20_transfer_tx(Address::repeat_byte(1), Address::repeat_byte(2), U256::from(5));
        let data = tx.data.unwrap();
        assert_eq!(&data[0..4], &[0xa9, 0x05, 0x9c, 0xbb]);
        assert_eq!(data.len(), 4 + 32 * 2);
    }

    #[test]
    fn factory_rejects_bad_key_without_echoing_it() {
        let factory = EvmClientFactory {
            providers: HashMap::new(),
            artifacts: Some(Arc::new(CcipArtifacts {
                sender: ContractArtifact { abi: Default::default(), bytecode: Bytes::from(vec![0x60]) },
                receiver: ContractArtifact { abi: Default::default(), bytecode: Bytes::from(vec![0x60]) },
            })),
            explorer_url: "https://ccip.chain.link/msg".into(),
        };
        let err = factory
            .connect(&SecretString::new("not-a-key-s3cr3t".into()))
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "Invalid private key");
    }

    #[test]
    fn factory_requires_artifacts() {
        let factory = EvmClientFactory {
            providers: HashMap::new(),
            artifacts: None,
            explorer_url: String::new(),
        };
        let key = SecretString::new(
            "0x4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318".into(),
        );
        assert!(factory.connect(&key).is_err());
    }
}
