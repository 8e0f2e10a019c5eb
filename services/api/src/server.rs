use crate::cli::ServeArgs;
use crate::infra::{AppState, LoggingImageStore};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use marketplace_core::auth::TokenCodec;
use marketplace_core::clock::SystemClock;
use marketplace_core::config::AppConfig;
use marketplace_core::error::AppError;
use marketplace_core::store::InMemoryStore;
use marketplace_core::telemetry;
use marketplace_core::Marketplace;
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

    let marketplace = Arc::new(Marketplace::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(LoggingImageStore),
        TokenCodec::new(&config.auth.jwt_secret, config.auth.token_ttl()),
        config.cache.ttls(),
        Arc::new(SystemClock),
    ));

    if let Some(seed) = &config.seed_admin {
        let admin = marketplace
            .accounts()
            .ensure_admin(&seed.email, &seed.password)?;
        info!(actor_id = %admin.id, "administrator account available");
    }

    let app = with_operational_routes(marketplace)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "property marketplace ready");

    axum::serve(listener, app).await?;
    Ok(())
}
