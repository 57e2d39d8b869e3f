use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use metrics_exporter_prometheus::PrometheusHandle;
use partner_portal::session::{AdminToken, IdentityError, IdentityGateway, PartnerIdentity};
use partner_portal::workflows::moderation::{
    ApplicationKey, ApplicationStatus, ApplicationStore, ApplicationStoreError,
    ApplicationSubmission, FeaturedApplication, ModerationDecision,
};
use partner_portal::workflows::onboarding::{
    DocumentRef, DocumentVault, LicenseFormat, PartnerId, PartnerProfile, ProfileStore,
    ProfileStoreError, ProgressUpdate, ValidatedLicense, VaultError, LICENSE_STEP,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Administrator tokens issued by the directory, shared with the application
/// store so moderation calls can validate the credential they were handed.
#[derive(Default)]
pub(crate) struct TokenRegistry {
    tokens: Mutex<HashSet<String>>,
}

impl TokenRegistry {
    pub(crate) fn register(&self, token: &AdminToken) {
        self.tokens
            .lock()
            .expect("token mutex poisoned")
            .insert(token.0.clone());
    }

    pub(crate) fn is_valid(&self, token: &AdminToken) -> bool {
        self.tokens
            .lock()
            .expect("token mutex poisoned")
            .contains(&token.0)
    }
}

struct PartnerAccount {
    password: String,
    identity: PartnerIdentity,
}

/// In-memory credential directory standing in for the external identity
/// check.
pub(crate) struct InMemoryDirectory {
    partners: Mutex<HashMap<String, PartnerAccount>>,
    admins: Mutex<HashMap<String, String>>,
    issued: Arc<TokenRegistry>,
    sequence: AtomicU64,
}

impl InMemoryDirectory {
    pub(crate) fn new(issued: Arc<TokenRegistry>) -> Self {
        Self {
            partners: Mutex::new(HashMap::new()),
            admins: Mutex::new(HashMap::new()),
            issued,
            sequence: AtomicU64::new(0),
        }
    }

    pub(crate) fn seed_partner(
        &self,
        email: &str,
        password: &str,
        display_name: &str,
        business_name: Option<&str>,
    ) {
        let key = email.trim().to_ascii_lowercase();
        self.partners.lock().expect("partner mutex poisoned").insert(
            key,
            PartnerAccount {
                password: password.to_string(),
                identity: PartnerIdentity {
                    email: email.trim().to_string(),
                    display_name: display_name.to_string(),
                    business_name: business_name.map(str::to_string),
                },
            },
        );
    }

    pub(crate) fn seed_admin(&self, email: &str, password: &str) {
        self.admins
            .lock()
            .expect("admin mutex poisoned")
            .insert(email.trim().to_ascii_lowercase(), password.to_string());
    }
}

#[async_trait::async_trait]
impl IdentityGateway for InMemoryDirectory {
    async fn verify_partner(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PartnerIdentity, IdentityError> {
        let partners = self.partners.lock().expect("partner mutex poisoned");
        partners
            .get(&email.trim().to_ascii_lowercase())
            .filter(|account| account.password == password)
            .map(|account| account.identity.clone())
            .ok_or(IdentityError::InvalidCredentials)
    }

    async fn verify_admin(&self, email: &str, password: &str) -> Result<AdminToken, IdentityError> {
        let known = {
            let admins = self.admins.lock().expect("admin mutex poisoned");
            admins
                .get(&email.trim().to_ascii_lowercase())
                .is_some_and(|expected| expected == password)
        };
        if !known {
            return Err(IdentityError::InvalidCredentials);
        }

        let serial = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let token = AdminToken(format!("admin-session-{serial:04}"));
        self.issued.register(&token);
        Ok(token)
    }
}

/// In-memory profile store mirroring the external service's advance-by-one
/// rules.
#[derive(Default)]
pub(crate) struct InMemoryProfileStore {
    profiles: Mutex<HashMap<PartnerId, PartnerProfile>>,
}

impl InMemoryProfileStore {
    pub(crate) fn seed(&self, profile: PartnerProfile) {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .insert(profile.partner.clone(), profile);
    }
}

#[async_trait::async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch_profile(
        &self,
        partner: &PartnerId,
    ) -> Result<PartnerProfile, ProfileStoreError> {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .get(partner)
            .cloned()
            .ok_or(ProfileStoreError::NotFound)
    }

    async fn advance_progress(
        &self,
        partner: &PartnerId,
    ) -> Result<ProgressUpdate, ProfileStoreError> {
        let mut profiles = self.profiles.lock().expect("profile mutex poisoned");
        let profile = profiles
            .get_mut(partner)
            .ok_or(ProfileStoreError::NotFound)?;
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
        let mut profiles = self.profiles.lock().expect("profile mutex poisoned");
        let profile = profiles
            .get_mut(partner)
            .ok_or(ProfileStoreError::NotFound)?;
        profile.progress = LICENSE_STEP;
        profile.verified = true;
        Ok(ProgressUpdate {
            progress: profile.progress,
            verified: profile.verified,
        })
    }
}

/// In-memory document vault keyed by the generated document name.
#[derive(Default)]
pub(crate) struct InMemoryLicenseVault {
    documents: Mutex<HashMap<String, (LicenseFormat, Vec<u8>)>>,
}

impl InMemoryLicenseVault {
    pub(crate) fn document_count(&self) -> usize {
        self.documents.lock().expect("vault mutex poisoned").len()
    }
}

#[async_trait::async_trait]
impl DocumentVault for InMemoryLicenseVault {
    async fn store_license(
        &self,
        partner: &PartnerId,
        license: ValidatedLicense,
    ) -> Result<DocumentRef, VaultError> {
        let safe = partner.as_str().replace(['@', '.'], "_");
        let name = format!("license_{safe}.{}", license.format.extension());
        self.documents
            .lock()
            .expect("vault mutex poisoned")
            .insert(name.clone(), (license.format, license.payload));
        Ok(DocumentRef(name))
    }
}

/// In-memory application store validating the admin credential against the
/// shared token registry.
pub(crate) struct InMemoryApplicationStore {
    records: Mutex<Vec<FeaturedApplication>>,
    sequence: AtomicU64,
    tokens: Arc<TokenRegistry>,
}

impl InMemoryApplicationStore {
    pub(crate) fn new(tokens: Arc<TokenRegistry>) -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            sequence: AtomicU64::new(0),
            tokens,
        }
    }

    fn check_admin(&self, admin: &AdminToken) -> Result<(), ApplicationStoreError> {
        if self.tokens.is_valid(admin) {
            Ok(())
        } else {
            Err(ApplicationStoreError::Unauthorized)
        }
    }
}

#[async_trait::async_trait]
impl ApplicationStore for InMemoryApplicationStore {
    async fn list(
        &self,
        admin: &AdminToken,
    ) -> Result<Vec<FeaturedApplication>, ApplicationStoreError> {
        self.check_admin(admin)?;
        Ok(self.records.lock().expect("record mutex poisoned").clone())
    }

    async fn set_status(
        &self,
        admin: &AdminToken,
        key: &ApplicationKey,
        decision: ModerationDecision,
    ) -> Result<FeaturedApplication, ApplicationStoreError> {
        self.check_admin(admin)?;
        let mut records = self.records.lock().expect("record mutex poisoned");
        let record = records
            .iter_mut()
            .find(|record| record.matches(key))
            .ok_or(ApplicationStoreError::NotFound)?;
        if record.status.is_terminal() {
            return Err(ApplicationStoreError::NotPending {
                status: record.status,
            });
        }
        record.status = decision.resulting_status();
        Ok(record.clone())
    }

    async fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<FeaturedApplication, ApplicationStoreError> {
        let mut records = self.records.lock().expect("record mutex poisoned");
        let duplicate = records.iter().any(|record| {
            record
                .email
                .as_deref()
                .is_some_and(|email| email.eq_ignore_ascii_case(&submission.email))
        });
        if duplicate {
            return Err(ApplicationStoreError::DuplicateEmail);
        }

        let serial = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let record = FeaturedApplication {
            id: Some(format!("app-{serial:06}")),
            name: submission.name.clone(),
            email: Some(submission.email.clone()),
            contact: submission.contact.clone(),
            business_name: submission.business_name().to_string(),
            category: submission.category,
            status: ApplicationStatus::Pending,
            document: None,
            submitted_on: chrono::Utc::now().date_naive(),
        };
        records.push(record.clone());
        Ok(record)
    }
}
