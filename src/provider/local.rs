//! Keystore-backed wallet provider
//!
//! Production [`WalletProvider`] implementation backed by a local
//! private-key signer and HTTP broadcast.
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are held in alloy's signer types which handle crypto securely
//! - Keys are never serialized and never logged
//! - Everything else sees only the public address and signing requests

use crate::config::{ChainParams, RpcConfig};
use crate::provider::{ProviderError, WalletProvider};
use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::{Address, TxHash};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::local::PrivateKeySigner;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Wallet provider holding its key material in-process
pub struct LocalProvider {
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy integration
    wallet: EthereumWallet,
    /// Broadcast endpoints per chain
    rpc: RpcConfig,
    /// Chain transactions are currently signed against
    active_chain: RwLock<u64>,
    /// Chains registered at runtime through the add-chain request
    added_chains: RwLock<HashMap<u64, String>>,
}

impl LocalProvider {
    /// Create a provider from an environment variable holding a hex key
    ///
    /// # Security
    /// The environment variable should contain a hex-encoded private key.
    /// Consider using a secrets manager in production.
    pub fn from_env(var_name: &str, rpc: RpcConfig, initial_chain: u64) -> Result<Self> {
        let key_hex = std::env::var(var_name).map_err(|_| {
            Error::Config(format!(
                "Environment variable {} not set. Required for wallet initialization.",
                var_name
            ))
        })?;

        Self::from_hex(&key_hex, rpc, initial_chain)
    }

    /// Create a provider from a hex-encoded private key
    pub fn from_hex(key_hex: &str, rpc: RpcConfig, initial_chain: u64) -> Result<Self> {
        // Remove 0x prefix if present
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Config(format!("invalid private key: {}", e)))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        Ok(Self {
            address,
            wallet,
            rpc,
            active_chain: RwLock::new(initial_chain),
            added_chains: RwLock::new(HashMap::new()),
        })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// RPC URL for a chain, preferring the configured set over runtime adds
    async fn rpc_url(&self, chain_id: u64) -> Option<String> {
        if let Some(url) = self.rpc.get(chain_id) {
            return Some(url.to_string());
        }
        self.added_chains.read().await.get(&chain_id).cloned()
    }
}

#[async_trait]
impl WalletProvider for LocalProvider {
    async fn request_accounts(&self) -> std::result::Result<Vec<Address>, ProviderError> {
        // A local keystore has nothing to prompt; the key's address is the
        // one authorized account.
        Ok(vec![self.address])
    }

    async fn accounts(&self) -> std::result::Result<Vec<Address>, ProviderError> {
        Ok(vec![self.address])
    }

    async fn chain_id(&self) -> std::result::Result<u64, ProviderError> {
        Ok(*self.active_chain.read().await)
    }

    async fn switch_chain(&self, chain_id: u64) -> std::result::Result<(), ProviderError> {
        if self.rpc_url(chain_id).await.is_none() {
            return Err(ProviderError::UnknownChain(chain_id));
        }
        *self.active_chain.write().await = chain_id;
        tracing::debug!(chain_id, "switched active chain");
        Ok(())
    }

    async fn add_chain(&self, params: &ChainParams) -> std::result::Result<(), ProviderError> {
        let url = params
            .rpc_urls
            .first()
            .ok_or_else(|| ProviderError::Other("chain parameters carry no RPC URL".to_string()))?;

        self.added_chains
            .write()
            .await
            .insert(params.chain_id, url.clone());
        tracing::info!(chain_id = params.chain_id, chain = %params.chain_name, "added chain");
        Ok(())
    }

    async fn send_transaction(
        &self,
        tx: TransactionRequest,
    ) -> std::result::Result<TxHash, ProviderError> {
        let chain_id = *self.active_chain.read().await;
        let rpc_url = self
            .rpc_url(chain_id)
            .await
            .ok_or(ProviderError::UnknownChain(chain_id))?;

        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| ProviderError::Other(format!("invalid RPC URL: {}", e)))?;

        let provider = ProviderBuilder::new()
            .wallet(self.wallet.clone())
            .connect_http(url);

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| ProviderError::Other(format!("broadcast failed: {}", e)))?;

        // Broadcast acceptance only; confirmation is not tracked
        Ok(*pending.tx_hash())
    }
}

// Implement Debug manually to avoid exposing the wallet
impl std::fmt::Debug for LocalProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalProvider")
            .field("address", &self.address)
            .field("wallet", &"[REDACTED]")
            .finish()
    }
}
