//! Skill Attestation Client
//!
//! A wallet-session and gateway client for on-chain skill attestations:
//! signed claims that one wallet address vouches for another's skill.
//! The attestation store itself lives in an external contract; this crate:
//! - Owns the wallet session lifecycle (connect, restore, disconnect)
//! - Builds and submits the `attestSkill` transaction
//! - Reconstructs attestation history from the contract's aggregate view
//!   and its event log
//!
//! # Security Model
//!
//! - Private keys never leave the provider module
//! - The session is an explicitly passed handle, never global state
//! - Every wallet and RPC operation runs under a configurable timeout

pub mod attestation;
pub mod config;
pub mod gateway;
pub mod provider;
pub mod session;

mod error;

// Re-export commonly used types
pub use attestation::{AttestationHistory, AttestationInput, AttestationRecord, TxReference};
pub use config::{Config, RpcConfig};
pub use error::{Error, Result};
pub use gateway::AttestationGateway;
pub use provider::{LocalProvider, ProviderError, WalletProvider};
pub use session::{Session, SessionManager, SessionStore};
