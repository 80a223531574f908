//! Attestation domain types
//!
//! Input validation on the write side, and the record/history projections
//! the read paths produce. Records are projections of external contract
//! state; nothing here is persisted or mutated locally.

use crate::config::EXPLORER_URL;
use crate::{Error, Result};
use alloy::primitives::{Address, TxHash};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Minimum skill length accepted for submission
pub const MIN_SKILL_LEN: usize = 2;
/// Minimum description length accepted for submission
pub const MIN_DESCRIPTION_LEN: usize = 10;

/// User-supplied attestation fields, validated before submission
///
/// Consumed once per submission attempt; the three fields reach the
/// contract call exactly as given here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttestationInput {
    /// Address being vouched for
    pub subject: Address,
    pub skill: String,
    pub description: String,
}

impl AttestationInput {
    /// Parse and validate raw form fields
    pub fn parse(subject: &str, skill: &str, description: &str) -> Result<Self> {
        let subject = Address::from_str(subject)
            .map_err(|e| Error::InvalidInput(format!("invalid subject address: {}", e)))?;

        if skill.chars().count() < MIN_SKILL_LEN {
            return Err(Error::InvalidInput(format!(
                "skill must be at least {} characters",
                MIN_SKILL_LEN
            )));
        }
        if description.chars().count() < MIN_DESCRIPTION_LEN {
            return Err(Error::InvalidInput(format!(
                "description must be at least {} characters",
                MIN_DESCRIPTION_LEN
            )));
        }

        Ok(Self {
            subject,
            skill: skill.to_string(),
            description: description.to_string(),
        })
    }
}

/// A single attestation as reported by the contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationRecord {
    pub attester: Address,
    pub subject: Address,
    pub skill: String,
    pub description: String,
    /// Block timestamp recorded by the contract (seconds since epoch)
    pub timestamp: u64,
}

impl AttestationRecord {
    /// Timestamp as UTC datetime, if it is representable
    pub fn timestamp_utc(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timestamp as i64, 0)
    }

    /// Case-insensitive substring match over skill, addresses, and description
    pub fn matches_search(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.skill.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self.attester.to_string().to_lowercase().contains(&term)
            || self.subject.to_string().to_lowercase().contains(&term)
    }
}

/// Opaque reference to a broadcast transaction
///
/// Returned on broadcast acceptance; no confirmation status is tracked.
#[derive(Debug, Clone, Serialize)]
pub struct TxReference {
    pub hash: TxHash,
}

impl TxReference {
    pub fn new(hash: TxHash) -> Self {
        Self { hash }
    }

    /// Block-explorer link for the transaction
    pub fn explorer_url(&self) -> String {
        format!("{}/tx/{:#x}", EXPLORER_URL, self.hash)
    }
}

impl fmt::Display for TxReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.hash)
    }
}

/// Tagged outcome of one read path
///
/// A failed path is tolerated and rendered as an empty set; the error is
/// kept so the caller can report it alongside the other path's records.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum ReadOutcome {
    Ok { records: Vec<AttestationRecord> },
    Failed { error: String },
}

impl ReadOutcome {
    /// Records for this path, empty when the path failed
    pub fn records(&self) -> &[AttestationRecord] {
        match self {
            ReadOutcome::Ok { records } => records,
            ReadOutcome::Failed { .. } => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ReadOutcome::Ok { .. } => None,
            ReadOutcome::Failed { error } => Some(error),
        }
    }
}

impl From<Result<Vec<AttestationRecord>>> for ReadOutcome {
    fn from(result: Result<Vec<AttestationRecord>>) -> Self {
        match result {
            Ok(records) => ReadOutcome::Ok { records },
            Err(e) => ReadOutcome::Failed {
                error: e.to_string(),
            },
        }
    }
}

/// Both sides of an address's attestation history
///
/// The two paths come from different sources (aggregate view vs event log)
/// and fail independently of each other.
#[derive(Debug, Clone, Serialize)]
pub struct AttestationHistory {
    /// Attestations others recorded for this address
    pub received: ReadOutcome,
    /// Attestations this address recorded for others
    pub given: ReadOutcome,
}

impl AttestationHistory {
    pub fn from_results(
        received: Result<Vec<AttestationRecord>>,
        given: Result<Vec<AttestationRecord>>,
    ) -> Self {
        Self {
            received: received.into(),
            given: given.into(),
        }
    }
}
