use crate::cli::ServeArgs;
use crate::infra::{seed_demo_store, AppState, InMemoryLicensingStore, InMemoryReviewerDirectory};
use crate::routes::with_licensing_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use chrono::Utc;
use club_licensing::config::{AppConfig, AppEnvironment};
use club_licensing::error::AppError;
use club_licensing::telemetry;
use club_licensing::workflows::licensing::{LicensingError, LicensingReviewService};
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

    let store = Arc::new(InMemoryLicensingStore::default());
    let directory = Arc::new(InMemoryReviewerDirectory::default());
    if config.environment != AppEnvironment::Production {
        seed_demo_store(
            &store,
            &directory,
            Utc::now().date_naive(),
            config.licensing.status_codes.approved,
        )
        .map_err(LicensingError::from)?;
        info!("seeded in-memory store with the demo application");
    }

    let service = Arc::new(LicensingReviewService::new(
        store,
        directory,
        config.licensing.clone(),
    ));

    let app = with_licensing_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "club licensing review service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
