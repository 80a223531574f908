//! Wallet session lifecycle
//!
//! Owns the connection state (address, chain clients), persists and
//! restores it, and exposes connect/disconnect. The manager is an
//! explicitly passed handle with one logical session per process; the
//! gateway borrows it for the duration of a single call and never keeps
//! client handles across a disconnect/reconnect cycle.

mod store;

pub use store::SessionStore;

use crate::config::{RpcConfig, TARGET_CHAIN_ID};
use crate::provider::{ProviderError, WalletProvider};
use crate::{Error, Result};
use alloy::primitives::Address;
use alloy::providers::{Provider, ProviderBuilder};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Point-in-time view of the wallet session
///
/// `connected` is true exactly when an address is present.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub address: Option<Address>,
    pub connected: bool,
}

/// Manages the single wallet session of the process
pub struct SessionManager {
    /// Injected wallet, absent when no signer is available
    provider: Option<Arc<dyn WalletProvider>>,
    store: SessionStore,
    rpc: RpcConfig,
    request_timeout: Duration,
    /// Connected address; `None` is the disconnected state
    address: RwLock<Option<Address>>,
}

impl SessionManager {
    pub fn new(
        provider: Option<Arc<dyn WalletProvider>>,
        store: SessionStore,
        rpc: RpcConfig,
        request_timeout: Duration,
    ) -> Self {
        Self {
            provider,
            store,
            rpc,
            request_timeout,
            address: RwLock::new(None),
        }
    }

    /// Request authorization from the wallet and open a session
    ///
    /// On success the address is persisted for later restore. A rejection
    /// leaves the session disconnected and persists nothing; the caller
    /// decides whether to retry.
    pub async fn connect(&self) -> Result<Address> {
        let provider = self.provider.as_ref().ok_or(Error::ProviderUnavailable)?;

        let accounts = self.timed(provider.request_accounts()).await?;
        let address = accounts
            .first()
            .copied()
            .ok_or(Error::Provider(ProviderError::Rejected))?;

        self.store.save(address).await?;
        *self.address.write().await = Some(address);

        info!(address = %address, "wallet connected");
        Ok(address)
    }

    /// Clear the session and the persisted address; idempotent
    pub async fn disconnect(&self) -> Result<()> {
        *self.address.write().await = None;
        self.store.clear().await?;
        info!("wallet disconnected");
        Ok(())
    }

    /// Restore a previously-saved session
    ///
    /// The saved address is re-validated against the provider's
    /// currently-authorized accounts without prompting; a session is never
    /// claimed on trust alone. A stale entry (address no longer authorized)
    /// is cleared. Returns the restored address, or `None` when nothing
    /// could be restored.
    pub async fn restore(&self) -> Result<Option<Address>> {
        let Some(saved) = self.store.load().await? else {
            return Ok(None);
        };

        let Some(provider) = self.provider.as_ref() else {
            debug!(address = %saved, "saved session found but no provider present");
            return Ok(None);
        };

        let accounts = match self.timed(provider.accounts()).await {
            Ok(accounts) => accounts,
            Err(e) => {
                warn!(error = %e, "could not re-validate saved session");
                return Ok(None);
            }
        };

        if !accounts.contains(&saved) {
            warn!(address = %saved, "saved address no longer authorized, clearing stale session");
            self.store.clear().await?;
            return Ok(None);
        }

        *self.address.write().await = Some(saved);
        debug!(address = %saved, "session restored");
        Ok(Some(saved))
    }

    /// Connected address, if any
    pub async fn address(&self) -> Option<Address> {
        *self.address.read().await
    }

    pub async fn is_connected(&self) -> bool {
        self.address.read().await.is_some()
    }

    /// Snapshot of the current session state
    pub async fn snapshot(&self) -> Session {
        let address = *self.address.read().await;
        Session {
            address,
            connected: address.is_some(),
        }
    }

    /// Signing-capable wallet handle, lent for the duration of one call
    pub fn wallet_provider(&self) -> Option<Arc<dyn WalletProvider>> {
        self.provider.clone()
    }

    /// Read-only provider for the attestation chain
    ///
    /// Usable whether or not a wallet session is active.
    pub fn read_provider(&self) -> Result<impl Provider + Clone> {
        let rpc_url = self.rpc.get(TARGET_CHAIN_ID).ok_or_else(|| {
            Error::Config(format!("no RPC URL configured for chain {}", TARGET_CHAIN_ID))
        })?;

        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("invalid RPC URL: {}", e)))?;

        Ok(ProviderBuilder::new().connect_http(url))
    }

    /// Timeout applied to wallet and RPC calls
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Run a provider request under the configured timeout
    async fn timed<T>(
        &self,
        fut: impl Future<Output = std::result::Result<T, ProviderError>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.request_timeout, fut).await {
            Ok(result) => result.map_err(Error::Provider),
            Err(_) => Err(Error::Provider(ProviderError::Other(format!(
                "no response after {}s",
                self.request_timeout.as_secs()
            )))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::rpc::chains;
    use crate::config::ChainParams;
    use alloy::primitives::{address, TxHash};
    use alloy::rpc::types::TransactionRequest;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ADDR: Address = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

    /// Wallet double with scriptable authorization behavior
    struct MockProvider {
        authorized: Vec<Address>,
        reject: bool,
        hang: bool,
        prompts: AtomicUsize,
    }

    impl MockProvider {
        fn authorizing(address: Address) -> Self {
            Self {
                authorized: vec![address],
                reject: false,
                hang: false,
                prompts: AtomicUsize::new(0),
            }
        }

        fn rejecting() -> Self {
            Self {
                authorized: Vec::new(),
                reject: true,
                hang: false,
                prompts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl WalletProvider for MockProvider {
        async fn request_accounts(&self) -> std::result::Result<Vec<Address>, ProviderError> {
            self.prompts.fetch_add(1, Ordering::SeqCst);
            if self.hang {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            if self.reject {
                return Err(ProviderError::Rejected);
            }
            Ok(self.authorized.clone())
        }

        async fn accounts(&self) -> std::result::Result<Vec<Address>, ProviderError> {
            Ok(self.authorized.clone())
        }

        async fn chain_id(&self) -> std::result::Result<u64, ProviderError> {
            Ok(chains::SEPOLIA)
        }

        async fn switch_chain(&self, _chain_id: u64) -> std::result::Result<(), ProviderError> {
            Ok(())
        }

        async fn add_chain(&self, _params: &ChainParams) -> std::result::Result<(), ProviderError> {
            Ok(())
        }

        async fn send_transaction(
            &self,
            _tx: TransactionRequest,
        ) -> std::result::Result<TxHash, ProviderError> {
            Ok(TxHash::ZERO)
        }
    }

    fn rpc() -> RpcConfig {
        let mut urls = HashMap::new();
        urls.insert(chains::SEPOLIA, "https://sepolia.example".to_string());
        RpcConfig::with_urls(urls)
    }

    fn manager(
        provider: Option<Arc<dyn WalletProvider>>,
        dir: &tempfile::TempDir,
    ) -> SessionManager {
        let store = SessionStore::new(dir.path().join("session.json"));
        SessionManager::new(provider, store, rpc(), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_connect_sets_state_and_persists() {
        let dir = tempfile::tempdir().unwrap();
        let session = manager(Some(Arc::new(MockProvider::authorizing(ADDR))), &dir);

        let connected = session.connect().await.unwrap();

        assert_eq!(connected, ADDR);
        assert!(session.is_connected().await);
        assert_eq!(session.address().await, Some(ADDR));

        // Address survives in the store
        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().await.unwrap(), Some(ADDR));
    }

    #[tokio::test]
    async fn test_connect_without_provider_fails() {
        let dir = tempfile::tempdir().unwrap();
        let session = manager(None, &dir);

        let err = session.connect().await.unwrap_err();

        assert!(matches!(err, Error::ProviderUnavailable));
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn test_connect_rejection_persists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let session = manager(Some(Arc::new(MockProvider::rejecting())), &dir);

        let err = session.connect().await.unwrap_err();

        assert!(matches!(err, Error::Provider(ProviderError::Rejected)));
        assert!(!session.is_connected().await);

        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_disconnect_clears_state_and_store() {
        let dir = tempfile::tempdir().unwrap();
        let session = manager(Some(Arc::new(MockProvider::authorizing(ADDR))), &dir);

        session.connect().await.unwrap();
        session.disconnect().await.unwrap();

        let snapshot = session.snapshot().await;
        assert!(!snapshot.connected);
        assert_eq!(snapshot.address, None);

        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().await.unwrap(), None);

        // Idempotent
        session.disconnect().await.unwrap();
    }

    #[tokio::test]
    async fn test_restore_does_not_prompt() {
        let dir = tempfile::tempdir().unwrap();
        SessionStore::new(dir.path().join("session.json"))
            .save(ADDR)
            .await
            .unwrap();

        let provider = Arc::new(MockProvider::authorizing(ADDR));
        let session = manager(Some(provider.clone()), &dir);

        let restored = session.restore().await.unwrap();

        assert_eq!(restored, Some(ADDR));
        assert!(session.is_connected().await);
        // Re-validation used the non-prompting accounts query only
        assert_eq!(provider.prompts.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_restore_clears_stale_address() {
        let dir = tempfile::tempdir().unwrap();
        let stale = address!("1111111111111111111111111111111111111111");
        SessionStore::new(dir.path().join("session.json"))
            .save(stale)
            .await
            .unwrap();

        // Provider now authorizes a different account
        let session = manager(Some(Arc::new(MockProvider::authorizing(ADDR))), &dir);

        assert_eq!(session.restore().await.unwrap(), None);
        assert!(!session.is_connected().await);

        let store = SessionStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_restore_without_provider_stays_disconnected() {
        let dir = tempfile::tempdir().unwrap();
        SessionStore::new(dir.path().join("session.json"))
            .save(ADDR)
            .await
            .unwrap();

        let session = manager(None, &dir);

        assert_eq!(session.restore().await.unwrap(), None);
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn test_restore_with_nothing_saved() {
        let dir = tempfile::tempdir().unwrap();
        let session = manager(Some(Arc::new(MockProvider::authorizing(ADDR))), &dir);

        assert_eq!(session.restore().await.unwrap(), None);
        assert!(!session.is_connected().await);
    }

    #[tokio::test]
    async fn test_connect_times_out_on_hung_provider() {
        let dir = tempfile::tempdir().unwrap();
        let provider = MockProvider {
            authorized: vec![ADDR],
            reject: false,
            hang: true,
            prompts: AtomicUsize::new(0),
        };
        let store = SessionStore::new(dir.path().join("session.json"));
        let session = SessionManager::new(
            Some(Arc::new(provider)),
            store,
            rpc(),
            Duration::from_millis(50),
        );

        let err = session.connect().await.unwrap_err();

        assert!(format!("{err}").contains("no response"));
        assert!(!session.is_connected().await);
    }
}
