use crate::session::identity::AdminToken;

use super::domain::{
    ApplicationKey, ApplicationStatus, ApplicationSubmission, FeaturedApplication,
};

/// The admin-facing transition requested for a pending application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationDecision {
    Approve,
    Reject,
}

impl ModerationDecision {
    pub const fn resulting_status(self) -> ApplicationStatus {
        match self {
            Self::Approve => ApplicationStatus::Approved,
            Self::Reject => ApplicationStatus::Rejected,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
        }
    }
}

/// External application store. Each operation suspends at exactly one
/// request/response boundary. `set_status` must refuse transitions on records
/// that are no longer pending; `Approved` and `Rejected` are terminal.
#[async_trait::async_trait]
pub trait ApplicationStore: Send + Sync {
    async fn list(
        &self,
        admin: &AdminToken,
    ) -> Result<Vec<FeaturedApplication>, ApplicationStoreError>;

    async fn set_status(
        &self,
        admin: &AdminToken,
        key: &ApplicationKey,
        decision: ModerationDecision,
    ) -> Result<FeaturedApplication, ApplicationStoreError>;

    async fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<FeaturedApplication, ApplicationStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ApplicationStoreError {
    #[error("administrator credential rejected")]
    Unauthorized,
    #[error("application not found")]
    NotFound,
    #[error("an application for this email already exists")]
    DuplicateEmail,
    #[error("application is already {}", .status.label())]
    NotPending { status: ApplicationStatus },
    #[error("application store unavailable: {0}")]
    Unavailable(String),
}
