use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

use partner_portal::session::{session_router, IdentityGateway, SessionManager, SessionVault};
use partner_portal::workflows::moderation::{moderation_router, ApplicationStore, ModerationQueue};
use partner_portal::workflows::onboarding::{
    onboarding_router, DocumentVault, OnboardingService, ProfileStore,
};

/// Composes the domain routers with the operational endpoints.
pub(crate) fn portal_routes<G, V, S, D, A>(
    sessions: Arc<SessionManager<G, V>>,
    onboarding: Arc<OnboardingService<S, D>>,
    moderation: Arc<ModerationQueue<A>>,
) -> axum::Router
where
    G: IdentityGateway + 'static,
    V: SessionVault + 'static,
    S: ProfileStore + 'static,
    D: DocumentVault + 'static,
    A: ApplicationStore + 'static,
{
    session_router(sessions)
        .merge(onboarding_router(onboarding))
        .merge(moderation_router(moderation))
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok", "service": "partner-portal" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(std::sync::atomic::Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
