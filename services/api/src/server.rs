use crate::cli::ServeArgs;
use crate::infra::{
    AppState, InMemoryAdvanceRepository, InMemoryAmendmentRepository, InMemoryContractDirectory,
};
use crate::routes::{with_workflow_routes, WorkflowServices};
use avenant::config::AppConfig;
use avenant::error::AppError;
use avenant::telemetry;
use avenant::workflows::advances::AdvanceService;
use avenant::workflows::amendments::{AmendmentService, SummaryPdfStore};
use avenant::workflows::contracts::ContractService;
use avenant::workflows::payroll::SalaryRecalculator;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
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

    let directory = Arc::new(InMemoryContractDirectory::seeded());
    let recalculator = SalaryRecalculator::new(config.payroll.cnss_rate);
    let services = WorkflowServices {
        contracts: Arc::new(ContractService::new(directory.clone(), recalculator)),
        amendments: Arc::new(AmendmentService::new(
            directory,
            Arc::new(InMemoryAmendmentRepository::default()),
            Arc::new(SummaryPdfStore),
        )),
        advances: Arc::new(AdvanceService::new(
            Arc::new(InMemoryAdvanceRepository::default()),
            config.payroll.max_advances_per_year,
        )),
    };

    let app = with_workflow_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        cnss_rate = %recalculator.deduction_rate(),
        max_advances_per_year = ?config.payroll.max_advances_per_year,
        "avenant workflow service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
