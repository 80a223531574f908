//! Error types for the attestation client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("no wallet provider available")]
    ProviderUnavailable,

    #[error("wallet not connected")]
    NotConnected,

    #[error("network switch failed: {0}")]
    NetworkSwitchFailed(String),

    #[error("submission rejected by signer")]
    SubmissionRejected,

    #[error("transaction failed: {0}")]
    Transaction(String),

    #[error("read failed: {0}")]
    Read(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("wallet provider error: {0}")]
    Provider(#[from] crate::provider::ProviderError),

    #[error("session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
