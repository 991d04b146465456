use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_credibility_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credence::config::AppConfig;
use credence::credibility::{CredibilityService, MemoryWorkStore, PgWorkStore, WorkRecordStore};
use credence::error::AppError;
use credence::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(url) = args.database_url.take() {
        config.database.url = Some(url);
    }

    telemetry::init(&config.telemetry)?;

    match config.database.url.clone() {
        Some(url) => {
            let store = PgWorkStore::connect(&url, config.database.max_connections).await?;
            info!(
                max_connections = config.database.max_connections,
                "connected to work record database"
            );
            serve(config, store).await
        }
        None => {
            warn!("DATABASE_URL not set; work records and scores are kept in memory");
            serve(config, MemoryWorkStore::default()).await
        }
    }
}

async fn serve<S>(config: AppConfig, store: S) -> Result<(), AppError>
where
    S: WorkRecordStore + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(CredibilityService::new(Arc::new(store)));

    let app = with_credibility_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "credibility scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
