use serde::{Deserialize, Serialize};

/// Identity record returned by the external credential check for a partner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartnerIdentity {
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
}

/// Opaque bearer token issued for an administrator session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdminToken(pub String);

/// Error raised by the external credential check.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

/// External identity check. Each call suspends at exactly one request/response
/// boundary.
#[async_trait::async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn verify_partner(
        &self,
        email: &str,
        password: &str,
    ) -> Result<PartnerIdentity, IdentityError>;

    async fn verify_admin(&self, email: &str, password: &str)
        -> Result<AdminToken, IdentityError>;
}
