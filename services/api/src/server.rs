use crate::cli::ServeArgs;
use crate::demo::default_criteria;
use crate::infra::{load_course, AppState, InMemoryCriteriaRepository, StaticCourseSource};
use crate::routes::with_scheincriteria_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use schein::config::AppConfig;
use schein::error::AppError;
use schein::scheincriteria::{CriteriaRegistry, ScheincriteriaService};
use schein::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?.with_overrides(args.host, args.port);

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let registry = Arc::new(CriteriaRegistry::builtin()?);
    let course = load_course(&config.course)?;
    let service = Arc::new(ScheincriteriaService::new(
        registry,
        Arc::new(InMemoryCriteriaRepository::default()),
        Arc::new(StaticCourseSource::new(course)),
    ));

    if config.course.dataset.is_none() {
        for dto in default_criteria() {
            service.create(dto)?;
        }
        info!("serving the demo course with its default criteria");
    }

    let app = with_scheincriteria_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "scheincriteria service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
