use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::identity::{AdminToken, PartnerIdentity};

/// Durable snapshot of both session slots. The slots are independent: holding
/// one implies nothing about the other.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSessions {
    #[serde(default)]
    pub partner: Option<PartnerIdentity>,
    #[serde(default)]
    pub admin: Option<AdminToken>,
}

/// Local key-value persistence for session credentials, read once at process
/// start and written on every login/logout.
pub trait SessionVault: Send + Sync {
    fn load(&self) -> Result<StoredSessions, SessionStoreError>;
    fn save(&self, sessions: &StoredSessions) -> Result<(), SessionStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
    #[error("session record corrupted: {0}")]
    Corrupted(String),
}

/// File-backed vault serializing both slots into a single JSON document, so
/// one write covers a full login/logout transition.
#[derive(Debug, Clone)]
pub struct JsonFileSessionVault {
    path: PathBuf,
}

impl JsonFileSessionVault {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionVault for JsonFileSessionVault {
    fn load(&self) -> Result<StoredSessions, SessionStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredSessions::default());
            }
            Err(err) => return Err(SessionStoreError::Unavailable(err.to_string())),
        };

        serde_json::from_str(&raw).map_err(|err| SessionStoreError::Corrupted(err.to_string()))
    }

    fn save(&self, sessions: &StoredSessions) -> Result<(), SessionStoreError> {
        let payload = serde_json::to_vec_pretty(sessions)
            .map_err(|err| SessionStoreError::Corrupted(err.to_string()))?;
        fs::write(&self.path, payload).map_err(|err| SessionStoreError::Unavailable(err.to_string()))
    }
}
