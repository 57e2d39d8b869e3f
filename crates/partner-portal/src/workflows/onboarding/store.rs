use serde::{Deserialize, Serialize};

use super::domain::{PartnerId, PartnerProfile};
use super::license::ValidatedLicense;

/// Server-computed progress snapshot returned by profile mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub progress: u8,
    pub verified: bool,
}

/// Reference to a stored license document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRef(pub String);

/// External profile store. Each operation suspends at exactly one
/// request/response boundary; advance-by-one semantics are owned server-side.
#[async_trait::async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch_profile(&self, partner: &PartnerId)
        -> Result<PartnerProfile, ProfileStoreError>;

    async fn advance_progress(
        &self,
        partner: &PartnerId,
    ) -> Result<ProgressUpdate, ProfileStoreError>;

    async fn mark_verified(
        &self,
        partner: &PartnerId,
        document: &DocumentRef,
    ) -> Result<ProgressUpdate, ProfileStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProfileStoreError {
    #[error("partner profile not found")]
    NotFound,
    #[error("profile store unavailable: {0}")]
    Unavailable(String),
}

/// External artifact store for verification documents.
#[async_trait::async_trait]
pub trait DocumentVault: Send + Sync {
    async fn store_license(
        &self,
        partner: &PartnerId,
        license: ValidatedLicense,
    ) -> Result<DocumentRef, VaultError>;
}

#[derive(Debug, thiserror::Error)]
pub enum VaultError {
    #[error("document rejected: {0}")]
    Rejected(String),
    #[error("document vault unavailable: {0}")]
    Unavailable(String),
}
