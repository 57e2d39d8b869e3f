//! Partner onboarding: the seven-step roadmap, the progress machine, and the
//! one-shot license verification that takes a business live.

pub mod domain;
pub mod license;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    DashboardView, PartnerId, PartnerProfile, StepState, StepTemplate, StepView, LICENSE_STEP,
    ROADMAP, STEP_COUNT,
};
pub use license::{LicenseError, LicenseFormat, LicenseUpload, ValidatedLicense};
pub use router::onboarding_router;
pub use service::{LicenseReceipt, OnboardingError, OnboardingService, StepOutcome};
pub use store::{
    DocumentRef, DocumentVault, ProfileStore, ProfileStoreError, ProgressUpdate, VaultError,
};
