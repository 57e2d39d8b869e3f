use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::workflows::onboarding::domain::{PartnerId, PartnerProfile, LICENSE_STEP};
use crate::workflows::onboarding::license::{LicenseFormat, ValidatedLicense};
use crate::workflows::onboarding::service::OnboardingService;
use crate::workflows::onboarding::store::{
    DocumentRef, DocumentVault, ProfileStore, ProfileStoreError, ProgressUpdate, VaultError,
};

pub(super) fn partner() -> PartnerId {
    PartnerId::from_email("owner@rivermill.ca")
}

pub(super) fn profile_at(progress: u8) -> PartnerProfile {
    PartnerProfile {
        progress,
        verified: progress == LICENSE_STEP,
        business_name: Some("Rivermill Bakery".to_string()),
        display_name: Some("owner".to_string()),
        ..PartnerProfile::new(partner())
    }
}

/// Profile store fake mirroring the external service's advance-by-one
/// semantics, with call counting for the idempotence laws.
#[derive(Default)]
pub(super) struct CountingProfileStore {
    profiles: Mutex<HashMap<PartnerId, PartnerProfile>>,
    pub(super) fetch_calls: AtomicUsize,
    pub(super) advance_calls: AtomicUsize,
    pub(super) verify_calls: AtomicUsize,
    pub(super) fail_next_advance: AtomicBool,
    pub(super) fail_next_verify: AtomicBool,
}

impl CountingProfileStore {
    pub(super) fn with_profile(profile: PartnerProfile) -> Self {
        let store = Self::default();
        store
            .profiles
            .lock()
            .expect("profile mutex")
            .insert(profile.partner.clone(), profile);
        store
    }
}

#[async_trait::async_trait]
impl ProfileStore for CountingProfileStore {
    async fn fetch_profile(
        &self,
        partner: &PartnerId,
    ) -> Result<PartnerProfile, ProfileStoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.profiles
            .lock()
            .expect("profile mutex")
            .get(partner)
            .cloned()
            .ok_or(ProfileStoreError::NotFound)
    }

    async fn advance_progress(
        &self,
        partner: &PartnerId,
    ) -> Result<ProgressUpdate, ProfileStoreError> {
        self.advance_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_advance.swap(false, Ordering::SeqCst) {
            return Err(ProfileStoreError::Unavailable(
                "connection reset".to_string(),
            ));
        }

        let mut profiles = self.profiles.lock().expect("profile mutex");
        let profile = profiles.get_mut(partner).ok_or(ProfileStoreError::NotFound)?;
        if profile.progress < LICENSE_STEP {
            profile.progress += 1;
        }
        Ok(ProgressUpdate {
            progress: profile.progress,
            verified: profile.verified,
        })
    }

    async fn mark_verified(
        &self,
        partner: &PartnerId,
        _document: &DocumentRef,
    ) -> Result<ProgressUpdate, ProfileStoreError> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_verify.swap(false, Ordering::SeqCst) {
            return Err(ProfileStoreError::Unavailable(
                "connection reset".to_string(),
            ));
        }

        let mut profiles = self.profiles.lock().expect("profile mutex");
        let profile = profiles.get_mut(partner).ok_or(ProfileStoreError::NotFound)?;
        profile.progress = LICENSE_STEP;
        profile.verified = true;
        Ok(ProgressUpdate {
            progress: profile.progress,
            verified: profile.verified,
        })
    }
}

/// Document vault fake recording every accepted upload.
#[derive(Default)]
pub(super) struct MemoryVault {
    uploads: Mutex<Vec<(PartnerId, LicenseFormat, usize)>>,
    pub(super) fail_next: AtomicBool,
}

impl MemoryVault {
    pub(super) fn upload_count(&self) -> usize {
        self.uploads.lock().expect("vault mutex").len()
    }
}

#[async_trait::async_trait]
impl DocumentVault for MemoryVault {
    async fn store_license(
        &self,
        partner: &PartnerId,
        license: ValidatedLicense,
    ) -> Result<DocumentRef, VaultError> {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(VaultError::Unavailable("upload timed out".to_string()));
        }

        let mut uploads = self.uploads.lock().expect("vault mutex");
        uploads.push((partner.clone(), license.format, license.payload.len()));

        let safe = partner.as_str().replace(['@', '.'], "_");
        Ok(DocumentRef(format!(
            "license_{safe}.{}",
            license.format.extension()
        )))
    }
}

pub(super) fn build_service(
    profile: PartnerProfile,
) -> (
    Arc<OnboardingService<CountingProfileStore, MemoryVault>>,
    Arc<CountingProfileStore>,
    Arc<MemoryVault>,
) {
    let store = Arc::new(CountingProfileStore::with_profile(profile));
    let vault = Arc::new(MemoryVault::default());
    let service = Arc::new(OnboardingService::new(store.clone(), vault.clone()));
    (service, store, vault)
}
