use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::session::identity::AdminToken;

use super::domain::{
    ApplicationFormError, ApplicationKey, ApplicationStatus, ApplicationSubmission,
    FeaturedApplication,
};
use super::store::{ApplicationStore, ApplicationStoreError, ModerationDecision};

/// The administrator's control surface over submitted applications.
///
/// Approve/reject actions are exclusive across the whole queue: while one is
/// in flight every further attempt is refused immediately, so two
/// administrators (or a double-click) cannot race conflicting transitions on
/// the external store.
pub struct ModerationQueue<S> {
    store: Arc<S>,
    action_in_flight: AtomicBool,
}

/// Outcome of a moderation action: the transitioned record plus a fresh
/// listing fetched after the transition, so callers observe the
/// authoritative state rather than a local guess.
#[derive(Debug, Clone, Serialize)]
pub struct ModerationOutcome {
    pub application: FeaturedApplication,
    pub applications: Vec<FeaturedApplication>,
}

#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("another moderation action is still in flight")]
    Busy,
    #[error("application has neither an id nor an email to act on")]
    MissingKey,
    #[error(transparent)]
    Form(#[from] ApplicationFormError),
    #[error(transparent)]
    Store(#[from] ApplicationStoreError),
}

impl<S> ModerationQueue<S>
where
    S: ApplicationStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            action_in_flight: AtomicBool::new(false),
        }
    }

    /// Applications still awaiting review. Every call re-fetches; nothing is
    /// cached between calls.
    pub async fn list_pending(
        &self,
        admin: &AdminToken,
    ) -> Result<impl Iterator<Item = FeaturedApplication>, ModerationError> {
        let applications = self.store.list(admin).await?;
        Ok(applications
            .into_iter()
            .filter(|application| application.status == ApplicationStatus::Pending))
    }

    /// The full listing, pending and resolved, for the review table.
    pub async fn applications(
        &self,
        admin: &AdminToken,
    ) -> Result<Vec<FeaturedApplication>, ModerationError> {
        Ok(self.store.list(admin).await?)
    }

    pub async fn approve(
        &self,
        admin: &AdminToken,
        key: Option<ApplicationKey>,
    ) -> Result<ModerationOutcome, ModerationError> {
        self.resolve(admin, key, ModerationDecision::Approve).await
    }

    pub async fn reject(
        &self,
        admin: &AdminToken,
        key: Option<ApplicationKey>,
    ) -> Result<ModerationOutcome, ModerationError> {
        self.resolve(admin, key, ModerationDecision::Reject).await
    }

    /// Public intake: validated, then stored as pending. Submissions are not
    /// moderation actions and do not take the action guard.
    pub async fn submit(
        &self,
        submission: ApplicationSubmission,
    ) -> Result<FeaturedApplication, ModerationError> {
        submission.validate()?;
        let stored = self.store.submit(submission).await?;
        tracing::info!(business = %stored.business_name, "featured application received");
        Ok(stored)
    }

    async fn resolve(
        &self,
        admin: &AdminToken,
        key: Option<ApplicationKey>,
        decision: ModerationDecision,
    ) -> Result<ModerationOutcome, ModerationError> {
        let key = key.ok_or(ModerationError::MissingKey)?;
        let _guard = self.begin_action()?;

        let application = self.store.set_status(admin, &key, decision).await?;
        tracing::info!(key = %key, action = decision.label(), "application moderated");

        let applications = self.store.list(admin).await?;
        Ok(ModerationOutcome {
            application,
            applications,
        })
    }

    fn begin_action(&self) -> Result<ActionGuard<'_>, ModerationError> {
        if self
            .action_in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Acquire)
            .is_err()
        {
            return Err(ModerationError::Busy);
        }
        Ok(ActionGuard {
            flag: &self.action_in_flight,
        })
    }
}

/// Releases the queue when the in-flight action resolves, on success or
/// failure.
struct ActionGuard<'a> {
    flag: &'a AtomicBool,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
