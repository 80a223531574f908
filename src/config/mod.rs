//! Configuration for the attestation client

pub mod rpc;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::time::Duration;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Private key environment variable name
pub const PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Chain the attestation contract is deployed on (Sepolia)
pub const TARGET_CHAIN_ID: u64 = 11_155_111;

/// Deployed SkillAttestation contract
pub const ATTESTATION_CONTRACT: Address = address!("4c9a2b8e4b7f31a6de8e5a7c91f0d2b3a4e5c6f7");

/// Block explorer base URL for transaction links
pub const EXPLORER_URL: &str = "https://sepolia.etherscan.io";

/// Parameters a wallet needs to register a chain it does not know yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainParams {
    pub chain_id: u64,
    pub chain_name: String,
    pub rpc_urls: Vec<String>,
    pub native_currency_symbol: String,
    pub native_currency_decimals: u8,
    pub block_explorer_urls: Vec<String>,
}

impl ChainParams {
    /// Fixed add-network parameters for the attestation chain
    pub fn sepolia() -> Self {
        Self {
            chain_id: TARGET_CHAIN_ID,
            chain_name: "Sepolia".to_string(),
            rpc_urls: vec![rpc::public_rpcs::SEPOLIA.to_string()],
            native_currency_symbol: "ETH".to_string(),
            native_currency_decimals: 18,
            block_explorer_urls: vec![EXPLORER_URL.to_string()],
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path of the persisted session file
    pub session_file: String,
    /// Timeout applied to every wallet and RPC call (seconds)
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            session_file: "session.json".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sepolia_chain_params_match_target() {
        let params = ChainParams::sepolia();
        assert_eq!(params.chain_id, TARGET_CHAIN_ID);
        assert_eq!(params.native_currency_decimals, 18);
        assert!(!params.rpc_urls.is_empty());
        assert_eq!(params.block_explorer_urls, vec![EXPLORER_URL.to_string()]);
    }

    #[test]
    fn config_deserialize_roundtrip() {
        let value = serde_json::json!({
            "session_file": "/tmp/session.json",
            "request_timeout_secs": 5
        });
        let parsed: Config = serde_json::from_value(value).expect("parse config");
        assert_eq!(parsed.session_file, "/tmp/session.json");
        assert_eq!(parsed.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn config_defaults() {
        let config = Config::default();
        assert_eq!(config.session_file, "session.json");
        assert_eq!(config.request_timeout_secs, 30);
    }
}
