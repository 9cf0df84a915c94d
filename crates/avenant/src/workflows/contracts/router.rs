use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tracing::warn;

use super::domain::{Contract, ContractId};
use super::repository::ContractDirectory;
use super::service::{ContractService, ContractServiceError};

/// Router exposing contract reads/updates and the directory listings.
pub fn contract_router<C>(service: Arc<ContractService<C>>) -> Router
where
    C: ContractDirectory + 'static,
{
    Router::new()
        .route(
            "/contracts/:contract_id",
            get(get_handler::<C>).put(update_handler::<C>),
        )
        .route("/departments", get(departments_handler::<C>))
        .route("/employees/simple-list", get(employees_handler::<C>))
        .with_state(service)
}

pub(crate) async fn get_handler<C>(
    State(service): State<Arc<ContractService<C>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    C: ContractDirectory + 'static,
{
    match service.get(&ContractId(contract_id)) {
        Ok(contract) => (StatusCode::OK, Json(contract)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<C>(
    State(service): State<Arc<ContractService<C>>>,
    Path(contract_id): Path<String>,
    Json(contract): Json<Contract>,
) -> Response
where
    C: ContractDirectory + 'static,
{
    match service.update(&ContractId(contract_id), contract) {
        Ok((contract, breakdown)) => (
            StatusCode::OK,
            Json(json!({
                "contract": contract,
                "breakdown": breakdown,
            })),
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn departments_handler<C>(
    State(service): State<Arc<ContractService<C>>>,
) -> Response
where
    C: ContractDirectory + 'static,
{
    match service.departments() {
        Ok(departments) => (StatusCode::OK, Json(departments)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn employees_handler<C>(
    State(service): State<Arc<ContractService<C>>>,
) -> Response
where
    C: ContractDirectory + 'static,
{
    match service.employees() {
        Ok(employees) => (StatusCode::OK, Json(employees)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ContractServiceError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        warn!(error = %err, "contract request failed");
    }
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
