use crate::cli::ServeArgs;
use crate::infra::{AppState, ConfiguredStore};
use crate::routes::with_complaint_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use complaint_desk::complaints::ComplaintService;
use complaint_desk::config::AppConfig;
use complaint_desk::error::AppError;
use complaint_desk::telemetry;
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

    let store = ConfiguredStore::open(&config.storage)?;
    info!(store = %store.describe(), "complaint store opened");
    let complaint_service = Arc::new(ComplaintService::new(Arc::new(store)));

    let app = with_complaint_routes(complaint_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "complaint desk ready");

    axum::serve(listener, app).await?;
    Ok(())
}
