use crate::infra::AppState;
use avenant::workflows::advances::{advance_router, AdvanceRepository, AdvanceService};
use avenant::workflows::amendments::{
    amendment_router, AmendmentRepository, AmendmentService, DocumentStore,
};
use avenant::workflows::contracts::{contract_router, ContractDirectory, ContractService};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde_json::json;
use std::sync::Arc;

/// Shared services mounted behind the HTTP surface.
pub(crate) struct WorkflowServices<C, R, D, A> {
    pub(crate) contracts: Arc<ContractService<C>>,
    pub(crate) amendments: Arc<AmendmentService<C, R, D>>,
    pub(crate) advances: Arc<AdvanceService<A>>,
}

pub(crate) fn with_workflow_routes<C, R, D, A>(services: WorkflowServices<C, R, D, A>) -> Router
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
    A: AdvanceRepository + 'static,
{
    contract_router(services.contracts)
        .merge(amendment_router(services.amendments))
        .merge(advance_router(services.advances))
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
