use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryApplicationStore, InMemoryDirectory, InMemoryLicenseVault,
    InMemoryProfileStore, TokenRegistry,
};
use crate::routes::portal_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use partner_portal::config::AppConfig;
use partner_portal::error::AppError;
use partner_portal::session::{JsonFileSessionVault, SessionManager};
use partner_portal::telemetry;
use partner_portal::workflows::moderation::ModerationQueue;
use partner_portal::workflows::onboarding::OnboardingService;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = Arc::new(TokenRegistry::default());
    let directory = Arc::new(InMemoryDirectory::new(registry.clone()));
    directory.seed_admin(&config.admin.email, &config.admin.password);

    let session_vault = Arc::new(JsonFileSessionVault::new(config.session.store_path.clone()));
    let sessions = Arc::new(SessionManager::new(directory, session_vault)?);

    let profiles = Arc::new(InMemoryProfileStore::default());
    let license_vault = Arc::new(InMemoryLicenseVault::default());
    let onboarding = Arc::new(OnboardingService::new(profiles, license_vault));

    let applications = Arc::new(InMemoryApplicationStore::new(registry));
    let moderation = Arc::new(ModerationQueue::new(applications));

    let app = portal_routes(sessions, onboarding, moderation)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "partner portal service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
