use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::identity::IdentityGateway;
use super::store::SessionVault;
use super::{SessionError, SessionKind, SessionManager};

/// Router builder exposing login/logout/session endpoints for both actors.
pub fn session_router<G, V>(manager: Arc<SessionManager<G, V>>) -> Router
where
    G: IdentityGateway + 'static,
    V: SessionVault + 'static,
{
    Router::new()
        .route("/api/v1/partners/login", post(partner_login_handler::<G, V>))
        .route(
            "/api/v1/partners/logout",
            post(partner_logout_handler::<G, V>),
        )
        .route(
            "/api/v1/partners/session",
            get(partner_session_handler::<G, V>),
        )
        .route("/api/v1/admin/login", post(admin_login_handler::<G, V>))
        .route("/api/v1/admin/logout", post(admin_logout_handler::<G, V>))
        .with_state(manager)
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginRequest {
    email: String,
    password: String,
}

pub(crate) async fn partner_login_handler<G, V>(
    State(manager): State<Arc<SessionManager<G, V>>>,
    axum::Json(body): axum::Json<LoginRequest>,
) -> Response
where
    G: IdentityGateway + 'static,
    V: SessionVault + 'static,
{
    match manager.login_partner(&body.email, &body.password).await {
        Ok(identity) => (StatusCode::OK, axum::Json(identity)).into_response(),
        Err(err) => session_error_response(err),
    }
}

pub(crate) async fn partner_logout_handler<G, V>(
    State(manager): State<Arc<SessionManager<G, V>>>,
) -> Response
where
    G: IdentityGateway + 'static,
    V: SessionVault + 'static,
{
    match manager.logout(SessionKind::Partner) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "status": "logged_out" })),
        )
            .into_response(),
        Err(err) => session_error_response(err),
    }
}

pub(crate) async fn partner_session_handler<G, V>(
    State(manager): State<Arc<SessionManager<G, V>>>,
) -> Response
where
    G: IdentityGateway + 'static,
    V: SessionVault + 'static,
{
    (
        StatusCode::OK,
        axum::Json(json!({ "partner": manager.partner() })),
    )
        .into_response()
}

pub(crate) async fn admin_login_handler<G, V>(
    State(manager): State<Arc<SessionManager<G, V>>>,
    axum::Json(body): axum::Json<LoginRequest>,
) -> Response
where
    G: IdentityGateway + 'static,
    V: SessionVault + 'static,
{
    match manager.login_admin(&body.email, &body.password).await {
        Ok(token) => (StatusCode::OK, axum::Json(json!({ "token": token.0 }))).into_response(),
        Err(err) => session_error_response(err),
    }
}

pub(crate) async fn admin_logout_handler<G, V>(
    State(manager): State<Arc<SessionManager<G, V>>>,
) -> Response
where
    G: IdentityGateway + 'static,
    V: SessionVault + 'static,
{
    match manager.logout(SessionKind::Administrator) {
        Ok(()) => (
            StatusCode::OK,
            axum::Json(json!({ "status": "logged_out" })),
        )
            .into_response(),
        Err(err) => session_error_response(err),
    }
}

fn session_error_response(err: SessionError) -> Response {
    let status = match &err {
        SessionError::Authentication(_) | SessionError::AdministratorRequired => {
            StatusCode::UNAUTHORIZED
        }
        SessionError::Transport(_) => StatusCode::BAD_GATEWAY,
        SessionError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let body = axum::Json(json!({ "error": err.to_string() }));
    (status, body).into_response()
}
