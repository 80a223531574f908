//! Wallet provider abstraction
//!
//! Models the injected-wallet request surface: account authorization,
//! chain switching, and transaction signing/broadcast. The client only
//! shapes requests and responses; key custody and cryptography live
//! behind the trait.

mod local;

pub use local::LocalProvider;

use crate::config::ChainParams;
use alloy::primitives::{Address, TxHash};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

/// Provider-level failures
///
/// Kept separate from crate errors so callers can tell a user rejection
/// from an unknown chain while driving the switch protocol.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The user or provider declined the request
    #[error("request rejected")]
    Rejected,

    /// The provider does not know the requested chain
    #[error("unknown chain {0}")]
    UnknownChain(u64),

    #[error("provider error: {0}")]
    Other(String),
}

/// Request surface of an external wallet
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Prompt for account authorization
    ///
    /// The first returned address becomes the session address.
    async fn request_accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Currently-authorized accounts, without prompting
    ///
    /// Used to re-validate a restored session.
    async fn accounts(&self) -> Result<Vec<Address>, ProviderError>;

    /// Active chain ID
    async fn chain_id(&self) -> Result<u64, ProviderError>;

    /// Ask the provider to switch its active chain
    async fn switch_chain(&self, chain_id: u64) -> Result<(), ProviderError>;

    /// Register a chain the provider does not know yet
    async fn add_chain(&self, params: &ChainParams) -> Result<(), ProviderError>;

    /// Sign and broadcast a transaction from the authorized account
    ///
    /// Returns on broadcast acceptance without waiting for confirmation.
    async fn send_transaction(&self, tx: TransactionRequest) -> Result<TxHash, ProviderError>;
}
