use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::session::identity::AdminToken;

use super::domain::{ApplicationKey, ApplicationSubmission};
use super::queue::{ModerationError, ModerationQueue};
use super::store::{ApplicationStore, ApplicationStoreError};

/// Router builder exposing the intake and review endpoints.
pub fn moderation_router<S>(queue: Arc<ModerationQueue<S>>) -> Router
where
    S: ApplicationStore + 'static,
{
    Router::new()
        .route("/api/v1/featured/applications", post(submit_handler::<S>))
        .route("/api/v1/admin/applications", get(list_handler::<S>))
        .route(
            "/api/v1/admin/applications/approve",
            post(approve_handler::<S>),
        )
        .route(
            "/api/v1/admin/applications/reject",
            post(reject_handler::<S>),
        )
        .with_state(queue)
}

/// Action body: the store id when known, otherwise the applicant email.
#[derive(Debug, Deserialize)]
pub(crate) struct ActionRequest {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl ActionRequest {
    fn key(self) -> Option<ApplicationKey> {
        if let Some(id) = self.id.filter(|id| !id.trim().is_empty()) {
            return Some(ApplicationKey::Id(id));
        }
        self.email
            .filter(|email| !email.trim().is_empty())
            .map(ApplicationKey::Email)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<AdminToken> {
    let raw = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(AdminToken(token.to_string()))
    }
}

fn unauthorized() -> Response {
    let body = axum::Json(json!({ "error": "administrator session required" }));
    (StatusCode::UNAUTHORIZED, body).into_response()
}

pub(crate) async fn submit_handler<S>(
    State(queue): State<Arc<ModerationQueue<S>>>,
    axum::Json(submission): axum::Json<ApplicationSubmission>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    match queue.submit(submission).await {
        Ok(application) => (StatusCode::ACCEPTED, axum::Json(application)).into_response(),
        Err(err) => moderation_error_response(err),
    }
}

pub(crate) async fn list_handler<S>(
    State(queue): State<Arc<ModerationQueue<S>>>,
    headers: HeaderMap,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };

    match queue.applications(&token).await {
        Ok(applications) => (
            StatusCode::OK,
            axum::Json(json!({ "applications": applications })),
        )
            .into_response(),
        Err(err) => moderation_error_response(err),
    }
}

pub(crate) async fn approve_handler<S>(
    State(queue): State<Arc<ModerationQueue<S>>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<ActionRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };

    match queue.approve(&token, body.key()).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => moderation_error_response(err),
    }
}

pub(crate) async fn reject_handler<S>(
    State(queue): State<Arc<ModerationQueue<S>>>,
    headers: HeaderMap,
    axum::Json(body): axum::Json<ActionRequest>,
) -> Response
where
    S: ApplicationStore + 'static,
{
    let Some(token) = bearer_token(&headers) else {
        return unauthorized();
    };

    match queue.reject(&token, body.key()).await {
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome)).into_response(),
        Err(err) => moderation_error_response(err),
    }
}

fn moderation_error_response(err: ModerationError) -> Response {
    let status = match &err {
        ModerationError::Busy => StatusCode::CONFLICT,
        ModerationError::MissingKey | ModerationError::Form(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ModerationError::Store(ApplicationStoreError::Unauthorized) => StatusCode::UNAUTHORIZED,
        ModerationError::Store(ApplicationStoreError::NotFound) => StatusCode::NOT_FOUND,
        ModerationError::Store(ApplicationStoreError::DuplicateEmail) => StatusCode::CONFLICT,
        ModerationError::Store(ApplicationStoreError::NotPending { .. }) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ModerationError::Store(ApplicationStoreError::Unavailable(_)) => StatusCode::BAD_GATEWAY,
    };

    let body = axum::Json(json!({ "error": err.to_string() }));
    (status, body).into_response()
}
