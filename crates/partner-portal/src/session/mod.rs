//! Session ownership for the two portal actors.
//!
//! The manager is an explicitly owned instance injected into the onboarding
//! and moderation surfaces rather than ambient global state. It hydrates from
//! the durable vault at construction and only mutates through its own
//! login/logout methods, writing through to storage before the in-memory slot
//! changes.

pub mod identity;
pub mod router;
pub mod store;

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

pub use identity::{AdminToken, IdentityError, IdentityGateway, PartnerIdentity};
pub use router::session_router;
pub use store::{JsonFileSessionVault, SessionStoreError, SessionVault, StoredSessions};

/// Which actor a credential belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Partner,
    Administrator,
}

impl SessionKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Partner => "partner",
            Self::Administrator => "administrator",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{0}")]
    Authentication(String),
    #[error("administrator session required")]
    AdministratorRequired,
    #[error(transparent)]
    Storage(#[from] SessionStoreError),
    #[error("identity service unavailable: {0}")]
    Transport(String),
}

impl From<IdentityError> for SessionError {
    fn from(value: IdentityError) -> Self {
        match value {
            IdentityError::InvalidCredentials => {
                Self::Authentication("invalid credentials".to_string())
            }
            IdentityError::Unavailable(reason) => Self::Transport(reason),
        }
    }
}

/// Owns the partner and administrator session slots.
pub struct SessionManager<G, V> {
    gateway: Arc<G>,
    vault: Arc<V>,
    sessions: Mutex<StoredSessions>,
}

impl<G, V> SessionManager<G, V>
where
    G: IdentityGateway,
    V: SessionVault,
{
    /// Hydrates the in-memory slots from durable storage; no network call.
    pub fn new(gateway: Arc<G>, vault: Arc<V>) -> Result<Self, SessionError> {
        let sessions = vault.load()?;
        Ok(Self {
            gateway,
            vault,
            sessions: Mutex::new(sessions),
        })
    }

    pub async fn login_partner(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PartnerIdentity, SessionError> {
        let identity = self.gateway.verify_partner(email, password).await?;
        self.commit(|slots| slots.partner = Some(identity.clone()))?;
        tracing::info!(email = %identity.email, "partner session established");
        Ok(identity)
    }

    pub async fn login_admin(
        &self,
        email: &str,
        password: &str,
    ) -> Result<AdminToken, SessionError> {
        let token = self.gateway.verify_admin(email, password).await?;
        self.commit(|slots| slots.admin = Some(token.clone()))?;
        tracing::info!("administrator session established");
        Ok(token)
    }

    /// Clears the slot for the given kind unconditionally; idempotent.
    pub fn logout(&self, kind: SessionKind) -> Result<(), SessionError> {
        self.commit(|slots| match kind {
            SessionKind::Partner => slots.partner = None,
            SessionKind::Administrator => slots.admin = None,
        })?;
        tracing::info!(kind = kind.label(), "session cleared");
        Ok(())
    }

    pub fn partner(&self) -> Option<PartnerIdentity> {
        self.slots().partner
    }

    pub fn admin_token(&self) -> Option<AdminToken> {
        self.slots().admin
    }

    /// An administrator credential or a denial. A partner session is never
    /// upgraded.
    pub fn require_admin(&self) -> Result<AdminToken, SessionError> {
        self.admin_token().ok_or(SessionError::AdministratorRequired)
    }

    fn slots(&self) -> StoredSessions {
        self.sessions.lock().expect("session mutex poisoned").clone()
    }

    // Durable storage first; memory only once the write lands.
    fn commit(&self, apply: impl FnOnce(&mut StoredSessions)) -> Result<(), SessionError> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        let mut next = guard.clone();
        apply(&mut next);
        self.vault.save(&next)?;
        *guard = next;
        Ok(())
    }
}
