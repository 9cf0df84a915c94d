use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::domain::{AdvanceId, AdvanceSubmission, RefusalRequest};
use super::repository::AdvanceRepository;
use super::service::{AdvanceError, AdvanceService};
use crate::workflows::contracts::domain::EmployeeId;

#[derive(Debug, Deserialize)]
pub(crate) struct EligibilityQuery {
    pub date: Option<NaiveDate>,
}

pub fn advance_router<R>(service: Arc<AdvanceService<R>>) -> Router
where
    R: AdvanceRepository + 'static,
{
    Router::new()
        .route("/avances", post(create_handler::<R>))
        .route("/avances/:advance_id", get(get_handler::<R>))
        .route("/avances/:advance_id/submit", post(submit_handler::<R>))
        .route("/avances/:advance_id/validate", post(approve_handler::<R>))
        .route("/avances/:advance_id/refuse", post(refuse_handler::<R>))
        .route(
            "/avances/count-for-employee-current-year/:employee_id",
            get(count_handler::<R>),
        )
        .route(
            "/avances/eligibility/:employee_id",
            get(eligibility_handler::<R>),
        )
        .route("/parametres/max-avances", get(max_handler::<R>))
        .with_state(service)
}

pub(crate) async fn create_handler<R>(
    State(service): State<Arc<AdvanceService<R>>>,
    Json(submission): Json<AdvanceSubmission>,
) -> Response
where
    R: AdvanceRepository + 'static,
{
    match service.create(submission) {
        Ok(request) => (StatusCode::CREATED, Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<R>(
    State(service): State<Arc<AdvanceService<R>>>,
    Path(advance_id): Path<String>,
) -> Response
where
    R: AdvanceRepository + 'static,
{
    match service.get(&AdvanceId(advance_id)) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<R>(
    State(service): State<Arc<AdvanceService<R>>>,
    Path(advance_id): Path<String>,
) -> Response
where
    R: AdvanceRepository + 'static,
{
    match service.submit(&AdvanceId(advance_id)) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn approve_handler<R>(
    State(service): State<Arc<AdvanceService<R>>>,
    Path(advance_id): Path<String>,
) -> Response
where
    R: AdvanceRepository + 'static,
{
    match service.approve(&AdvanceId(advance_id)) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn refuse_handler<R>(
    State(service): State<Arc<AdvanceService<R>>>,
    Path(advance_id): Path<String>,
    Json(refusal): Json<RefusalRequest>,
) -> Response
where
    R: AdvanceRepository + 'static,
{
    match service.refuse(&AdvanceId(advance_id), &refusal.reason) {
        Ok(request) => (StatusCode::OK, Json(request)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn count_handler<R>(
    State(service): State<Arc<AdvanceService<R>>>,
    Path(employee_id): Path<String>,
) -> Response
where
    R: AdvanceRepository + 'static,
{
    let year = Utc::now().date_naive().year();
    match service.count_for_year(&EmployeeId(employee_id), year) {
        Ok(count) => (StatusCode::OK, Json(json!({ "year": year, "count": count }))).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn eligibility_handler<R>(
    State(service): State<Arc<AdvanceService<R>>>,
    Path(employee_id): Path<String>,
    Query(query): Query<EligibilityQuery>,
) -> Response
where
    R: AdvanceRepository + 'static,
{
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let eligibility = service.eligibility(&EmployeeId(employee_id), date);
    (StatusCode::OK, Json(eligibility)).into_response()
}

pub(crate) async fn max_handler<R>(State(service): State<Arc<AdvanceService<R>>>) -> Response
where
    R: AdvanceRepository + 'static,
{
    let payload = json!({ "max_avances_par_an": service.max_per_year() });
    (StatusCode::OK, Json(payload)).into_response()
}

fn error_response(err: AdvanceError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        warn!(error = %err, "advance request failed");
    }
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
