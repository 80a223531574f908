//! Persisted session storage
//!
//! One JSON file holding the last-connected address, so a session can be
//! restored across process starts. Removed on disconnect. No schema
//! versioning; an unreadable file is treated as no saved session.

use crate::Result;
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    address: String,
}

/// File-backed store for the last-connected wallet address
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Read the saved address, if any
    pub async fn load(&self) -> Result<Option<Address>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedSession = match serde_json::from_str(&content) {
            Ok(persisted) => persisted,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable session file, ignoring");
                return Ok(None);
            }
        };

        match Address::from_str(&persisted.address) {
            Ok(address) => Ok(Some(address)),
            Err(e) => {
                tracing::warn!(error = %e, "session file holds an invalid address, ignoring");
                Ok(None)
            }
        }
    }

    /// Save the connected address, replacing any previous entry
    pub async fn save(&self, address: Address) -> Result<()> {
        let persisted = PersistedSession {
            address: address.to_string(),
        };
        let content = serde_json::to_string_pretty(&persisted)?;
        tokio::fs::write(&self.path, content).await?;
        Ok(())
    }

    /// Remove the saved entry; safe to call when none exists
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn store(dir: &tempfile::TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("session.json"))
    }

    #[tokio::test]
    async fn test_load_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(store(&dir).load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let addr = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

        store.save(addr).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(addr));
    }

    #[tokio::test]
    async fn test_clear_removes_entry_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir);
        let addr = address!("f39fd6e51aad88f6f4ce6ab8827279cfffb92266");

        store.save(addr).await.unwrap();
        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);

        // Clearing again is fine
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        tokio::fs::write(&path, "not json at all").await.unwrap();

        let store = SessionStore::new(&path);
        assert_eq!(store.load().await.unwrap(), None);
    }
}
