use crate::cli::ServeArgs;
use crate::infra::{load_dataset, AppState};
use crate::routes::with_search_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use imoveis_search::config::AppConfig;
use imoveis_search::error::AppError;
use imoveis_search::search::SearchContext;
use imoveis_search::telemetry;
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

    let dataset = load_dataset(&config.search, None)?;
    let context = Arc::new(SearchContext {
        dataset: Arc::new(dataset),
        results_path: config.search.results_path.clone(),
    });

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_search_routes(context)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        results_path = %config.search.results_path,
        "listing search service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
