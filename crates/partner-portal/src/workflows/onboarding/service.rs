use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;

use super::domain::{DashboardView, PartnerId, PartnerProfile, LICENSE_STEP};
use super::license::{LicenseError, LicenseUpload};
use super::store::{DocumentRef, DocumentVault, ProfileStore, ProfileStoreError, VaultError};

type ProfileCell = Arc<tokio::sync::Mutex<PartnerProfile>>;

/// The onboarding progress machine and its verification transition.
///
/// Progress is mirrored per partner from the profile store and mutated only
/// when a store call reports success; transitions on the same profile are
/// serialized behind the profile's cell lock.
pub struct OnboardingService<S, V> {
    profiles: Arc<S>,
    vault: Arc<V>,
    cells: Mutex<HashMap<PartnerId, ProfileCell>>,
}

/// Result of a `mark_step_done` call. `Unchanged` is the idempotent no-op for
/// retries that do not know the current progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum StepOutcome {
    Advanced { progress: u8 },
    Unchanged { progress: u8 },
}

impl StepOutcome {
    pub fn progress(&self) -> u8 {
        match self {
            Self::Advanced { progress } | Self::Unchanged { progress } => *progress,
        }
    }
}

/// Successful verification: the stored document plus the terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct LicenseReceipt {
    pub document: DocumentRef,
    pub progress: u8,
    pub verified: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("unknown onboarding step {0}")]
    UnknownStep(u8),
    #[error(transparent)]
    License(#[from] LicenseError),
    #[error("partner is already verified")]
    AlreadyVerified,
    #[error("complete the earlier onboarding steps before uploading a license (currently at step {progress})")]
    LicenseLocked { progress: u8 },
    #[error("verification did not complete: {0}")]
    VerificationIncomplete(#[source] ProfileStoreError),
    #[error(transparent)]
    Store(#[from] ProfileStoreError),
    #[error(transparent)]
    Vault(#[from] VaultError),
}

impl<S, V> OnboardingService<S, V>
where
    S: ProfileStore,
    V: DocumentVault,
{
    pub fn new(profiles: Arc<S>, vault: Arc<V>) -> Self {
        Self {
            profiles,
            vault,
            cells: Mutex::new(HashMap::new()),
        }
    }

    /// Fresh roadmap snapshot for the partner dashboard. Always re-reads the
    /// store; the mirrored progress never moves backwards.
    pub async fn dashboard(&self, partner: &PartnerId) -> Result<DashboardView, OnboardingError> {
        let fresh = self.profiles.fetch_profile(partner).await?;
        let cell = self.cell_for(partner, &fresh);
        let mut profile = cell.lock().await;
        profile.progress = profile.progress.max(fresh.progress);
        profile.verified = profile.verified || fresh.verified;
        profile.business_name = fresh.business_name;
        profile.display_name = fresh.display_name;
        Ok(DashboardView::from_profile(&profile))
    }

    /// Advance the roadmap by exactly one step.
    ///
    /// Only the next pending step in the explicit range may advance; anything
    /// else already satisfied, out of order, or targeting the license step is
    /// answered `Unchanged` without contacting the store. A second call for
    /// the same profile queues behind the first.
    pub async fn mark_step_done(
        &self,
        partner: &PartnerId,
        ordinal: u8,
    ) -> Result<StepOutcome, OnboardingError> {
        if ordinal < 1 || ordinal > LICENSE_STEP {
            return Err(OnboardingError::UnknownStep(ordinal));
        }

        let cell = self.fetch_cell(partner).await?;
        let mut profile = cell.lock().await;

        if ordinal != profile.progress + 1 || ordinal < 2 || ordinal >= LICENSE_STEP {
            return Ok(StepOutcome::Unchanged {
                progress: profile.progress,
            });
        }

        let update = self.profiles.advance_progress(partner).await?;
        profile.progress = profile.progress.max(update.progress);
        tracing::info!(partner = %partner, progress = profile.progress, "onboarding step completed");

        Ok(StepOutcome::Advanced {
            progress: profile.progress,
        })
    }

    /// The one-shot verification transition.
    ///
    /// Validates the upload before any network call, then stores the document
    /// and marks the profile verified in sequence. If the profile update
    /// fails after the upload, the whole operation fails and the mirrored
    /// state is untouched.
    pub async fn submit_license(
        &self,
        partner: &PartnerId,
        upload: LicenseUpload,
    ) -> Result<LicenseReceipt, OnboardingError> {
        let license = upload.validate()?;

        let cell = self.fetch_cell(partner).await?;
        let mut profile = cell.lock().await;

        if profile.verified {
            return Err(OnboardingError::AlreadyVerified);
        }
        if !profile.license_step_unlocked() {
            return Err(OnboardingError::LicenseLocked {
                progress: profile.progress,
            });
        }

        let document = self.vault.store_license(partner, license).await?;
        let update = self
            .profiles
            .mark_verified(partner, &document)
            .await
            .map_err(OnboardingError::VerificationIncomplete)?;

        profile.progress = profile.progress.max(update.progress);
        profile.verified = update.verified;
        tracing::info!(partner = %partner, document = %document.0, "partner verified and live");

        Ok(LicenseReceipt {
            document,
            progress: profile.progress,
            verified: profile.verified,
        })
    }

    async fn fetch_cell(&self, partner: &PartnerId) -> Result<ProfileCell, OnboardingError> {
        {
            let cells = self.cells.lock().expect("profile cell mutex poisoned");
            if let Some(cell) = cells.get(partner) {
                return Ok(cell.clone());
            }
        }

        let profile = self.profiles.fetch_profile(partner).await?;
        Ok(self.cell_for(partner, &profile))
    }

    fn cell_for(&self, partner: &PartnerId, profile: &PartnerProfile) -> ProfileCell {
        let mut cells = self.cells.lock().expect("profile cell mutex poisoned");
        cells
            .entry(partner.clone())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(profile.clone())))
            .clone()
    }
}
