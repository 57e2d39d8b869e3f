use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::PartnerId;
use super::license::LicenseUpload;
use super::service::{OnboardingError, OnboardingService};
use super::store::{DocumentVault, ProfileStore, ProfileStoreError, VaultError};

/// Router builder exposing the partner roadmap endpoints.
pub fn onboarding_router<S, V>(service: Arc<OnboardingService<S, V>>) -> Router
where
    S: ProfileStore + 'static,
    V: DocumentVault + 'static,
{
    Router::new()
        .route(
            "/api/v1/partners/:email/dashboard",
            get(dashboard_handler::<S, V>),
        )
        .route(
            "/api/v1/partners/:email/steps/:ordinal/done",
            post(mark_step_handler::<S, V>),
        )
        .route(
            "/api/v1/partners/:email/license",
            post(upload_license_handler::<S, V>),
        )
        .with_state(service)
}

pub(crate) async fn dashboard_handler<S, V>(
    State(service): State<Arc<OnboardingService<S, V>>>,
    Path(email): Path<String>,
) -> Response
where
    S: ProfileStore + 'static,
    V: DocumentVault + 'static,
{
    let partner = PartnerId::from_email(&email);
    match service.dashboard(&partner).await {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => onboarding_error_response(err),
    }
}

pub(crate) async fn mark_step_handler<S, V>(
    State(service): State<Arc<OnboardingService<S, V>>>,
    Path((email, ordinal)): Path<(String, u8)>,
) -> Response
where
    S: ProfileStore + 'static,
    V: DocumentVault + 'static,
{
    let partner = PartnerId::from_email(&email);
    match service.mark_step_done(&partner, ordinal).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => onboarding_error_response(err),
    }
}

pub(crate) async fn upload_license_handler<S, V>(
    State(service): State<Arc<OnboardingService<S, V>>>,
    Path(email): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    S: ProfileStore + 'static,
    V: DocumentVault + 'static,
{
    let partner = PartnerId::from_email(&email);
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let upload = LicenseUpload::from_content_type(content_type, body.to_vec());

    match service.submit_license(&partner, upload).await {
        Ok(receipt) => (StatusCode::OK, axum::Json(receipt)).into_response(),
        Err(err) => onboarding_error_response(err),
    }
}

fn onboarding_error_response(err: OnboardingError) -> Response {
    let status = match &err {
        OnboardingError::UnknownStep(_) | OnboardingError::License(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        OnboardingError::AlreadyVerified | OnboardingError::LicenseLocked { .. } => {
            StatusCode::CONFLICT
        }
        OnboardingError::Store(ProfileStoreError::NotFound) => StatusCode::NOT_FOUND,
        OnboardingError::Store(ProfileStoreError::Unavailable(_))
        | OnboardingError::VerificationIncomplete(_) => StatusCode::BAD_GATEWAY,
        OnboardingError::Vault(VaultError::Rejected(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        OnboardingError::Vault(VaultError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
    };

    let body = axum::Json(json!({ "error": err.to_string() }));
    (status, body).into_response()
}
