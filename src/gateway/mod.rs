//! Attestation gateway
//!
//! Builds and submits the `attestSkill` transaction, and reconstructs
//! attestation history from the two read paths the contract exposes:
//! - `getAttestations(subject)` aggregate view for attestations received
//! - `SkillAttested` event log, filtered by attester, for attestations given
//!
//! The contract exposes no reverse-index view, so the two paths are
//! structurally different retrievals and fail independently of each other.
//! Nothing is cached locally; every call re-queries the network.

mod contract;

pub use contract::SkillAttestation;

use crate::attestation::{AttestationHistory, AttestationInput, AttestationRecord, TxReference};
use crate::config::{ChainParams, ATTESTATION_CONTRACT, TARGET_CHAIN_ID};
use crate::provider::{ProviderError, WalletProvider};
use crate::session::SessionManager;
use crate::{Error, Result};
use alloy::eips::BlockNumberOrTag;
use alloy::primitives::{Address, Bytes};
use alloy::providers::Provider;
use alloy::rpc::types::{Filter, TransactionRequest};
use alloy::sol_types::{SolCall, SolEvent};
use std::future::Future;
use tracing::{debug, info, warn};

/// Gateway to the external attestation contract
///
/// Borrows the session for the duration of each call; the session manager
/// keeps ownership of all client handles.
pub struct AttestationGateway<'a> {
    session: &'a SessionManager,
}

impl<'a> AttestationGateway<'a> {
    pub fn new(session: &'a SessionManager) -> Self {
        Self { session }
    }

    /// Encode and broadcast an attestation transaction
    ///
    /// Requires a connected session on the attestation chain; drives the
    /// switch/add/retry protocol against the wallet when the active chain
    /// differs. Returns on broadcast acceptance without waiting for
    /// confirmation. Failures leave the session untouched and are never
    /// retried here.
    pub async fn submit(&self, input: AttestationInput) -> Result<TxReference> {
        let attester = self.session.address().await.ok_or(Error::NotConnected)?;
        let provider = self
            .session
            .wallet_provider()
            .ok_or(Error::ProviderUnavailable)?;

        self.ensure_target_chain(provider.as_ref()).await?;

        let call = SkillAttestation::attestSkillCall {
            subject: input.subject,
            skill: input.skill,
            description: input.description,
        };
        let tx = TransactionRequest::default()
            .from(attester)
            .to(ATTESTATION_CONTRACT)
            .input(Bytes::from(call.abi_encode()).into());

        let hash = self
            .timed(provider.send_transaction(tx))
            .await
            .map_err(|e| match e {
                ProviderError::Rejected => Error::SubmissionRejected,
                other => Error::Transaction(other.to_string()),
            })?;

        info!(tx = %hash, subject = %call.subject, skill = %call.skill, "attestation broadcast");
        Ok(TxReference::new(hash))
    }

    /// Attestations recorded for a subject, via the aggregate view call
    ///
    /// The contract reports the full set in one call; there is no
    /// pagination. Failures surface as [`Error::Read`] for the caller to
    /// retry manually.
    pub async fn fetch_received(&self, subject: Address) -> Result<Vec<AttestationRecord>> {
        let provider = self.session.read_provider()?;
        let contract = SkillAttestation::new(ATTESTATION_CONTRACT, provider);

        let timeout = self.session.request_timeout();
        let attestations = tokio::time::timeout(timeout, contract.getAttestations(subject).call())
            .await
            .map_err(|_| {
                Error::Read(format!(
                    "getAttestations timed out after {}s",
                    timeout.as_secs()
                ))
            })?
            .map_err(|e| Error::Read(format!("getAttestations failed: {}", e)))?;

        debug!(subject = %subject, count = attestations.len(), "fetched received attestations");

        Ok(attestations
            .into_iter()
            .map(|a| AttestationRecord {
                attester: a.attester,
                subject,
                skill: a.skill,
                description: a.description,
                timestamp: a.timestamp.saturating_to(),
            })
            .collect())
    }

    /// Attestations recorded by an attester, via the event log
    ///
    /// Scans the full historical block range for the fixed event
    /// signature, filtered by the indexed attester topic.
    pub async fn fetch_given(&self, attester: Address) -> Result<Vec<AttestationRecord>> {
        let provider = self.session.read_provider()?;

        let filter = Filter::new()
            .address(ATTESTATION_CONTRACT)
            .event_signature(SkillAttestation::SkillAttested::SIGNATURE_HASH)
            .topic1(attester.into_word())
            .from_block(BlockNumberOrTag::Earliest)
            .to_block(BlockNumberOrTag::Latest);

        let timeout = self.session.request_timeout();
        let logs = tokio::time::timeout(timeout, provider.get_logs(&filter))
            .await
            .map_err(|_| Error::Read(format!("log query timed out after {}s", timeout.as_secs())))?
            .map_err(|e| Error::Read(format!("log query failed: {}", e)))?;

        debug!(attester = %attester, count = logs.len(), "fetched attestation logs");

        let mut records = Vec::with_capacity(logs.len());
        for log in logs {
            match SkillAttestation::SkillAttested::decode_log(&log.inner) {
                Ok(event) => records.push(AttestationRecord {
                    attester: event.data.attester,
                    subject: event.data.subject,
                    skill: event.data.skill,
                    description: event.data.description,
                    timestamp: event.data.timestamp.saturating_to(),
                }),
                Err(e) => warn!(error = %e, "skipping undecodable attestation log"),
            }
        }
        Ok(records)
    }

    /// Both read paths for one address, queried concurrently
    ///
    /// Each side fails independently; the caller renders whatever subset
    /// succeeded.
    pub async fn fetch_history(&self, address: Address) -> AttestationHistory {
        let (received, given) = futures::future::join(
            self.fetch_received(address),
            self.fetch_given(address),
        )
        .await;

        AttestationHistory::from_results(received, given)
    }

    /// Make sure the wallet's active chain is the attestation chain
    ///
    /// Switch protocol: request a switch; when the wallet does not know
    /// the chain, register it with the fixed parameters and retry once.
    async fn ensure_target_chain(&self, provider: &dyn WalletProvider) -> Result<()> {
        let active = self.timed(provider.chain_id()).await?;
        if active == TARGET_CHAIN_ID {
            return Ok(());
        }

        debug!(active, target = TARGET_CHAIN_ID, "switching wallet chain");
        match self.timed(provider.switch_chain(TARGET_CHAIN_ID)).await {
            Ok(()) => Ok(()),
            Err(ProviderError::UnknownChain(_)) => {
                self.timed(provider.add_chain(&ChainParams::sepolia()))
                    .await
                    .map_err(|e| Error::NetworkSwitchFailed(e.to_string()))?;
                self.timed(provider.switch_chain(TARGET_CHAIN_ID))
                    .await
                    .map_err(|e| Error::NetworkSwitchFailed(e.to_string()))
            }
            Err(e) => Err(Error::NetworkSwitchFailed(e.to_string())),
        }
    }

    /// Run a provider request under the session's timeout
    async fn timed<T>(
        &self,
        fut: impl Future<Output = std::result::Result<T, ProviderError>>,
    ) -> std::result::Result<T, ProviderError> {
        let timeout = self.session.request_timeout();
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Other(format!(
                "no response after {}s",
                timeout.as_secs()
            ))),
        }
    }
}
