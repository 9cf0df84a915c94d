use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use super::document::DocumentStore;
use super::domain::{AmendmentDraft, AmendmentId, ModificationCategory, SignedDocumentUpload};
use super::repository::AmendmentRepository;
use super::service::{AmendmentError, AmendmentService};
use crate::workflows::contracts::domain::ContractId;
use crate::workflows::contracts::repository::ContractDirectory;

/// Header carrying the acting user, recorded as `created_by`.
pub const USER_HEADER: &str = "x-user-id";

#[derive(Debug, Deserialize)]
pub(crate) struct ContractQuery {
    pub contract_id: String,
}

/// Router exposing the amendment lifecycle, defaults and register export.
pub fn amendment_router<C, R, D>(service: Arc<AmendmentService<C, R, D>>) -> Router
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    Router::new()
        .route(
            "/avenants",
            post(create_handler::<C, R, D>).get(list_handler::<C, R, D>),
        )
        .route(
            "/avenants/:amendment_id",
            get(get_handler::<C, R, D>)
                .put(update_handler::<C, R, D>)
                .delete(delete_handler::<C, R, D>),
        )
        .route(
            "/avenants/:amendment_id/amend",
            post(amend_handler::<C, R, D>),
        )
        .route(
            "/avenants/:amendment_id/submit",
            post(submit_handler::<C, R, D>),
        )
        .route(
            "/avenants/:amendment_id/validate",
            post(validate_handler::<C, R, D>),
        )
        .route(
            "/avenants/:amendment_id/generate-pdf",
            post(generate_handler::<C, R, D>),
        )
        .route(
            "/avenants/:amendment_id/upload-signed",
            post(upload_signed_handler::<C, R, D>),
        )
        .route(
            "/contracts/:contract_id/avenant-defaults/:category",
            get(defaults_handler::<C, R, D>),
        )
        .route(
            "/contracts/:contract_id/avenants/export",
            get(export_handler::<C, R, D>),
        )
        .with_state(service)
}

pub(crate) async fn create_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    headers: HeaderMap,
    Json(draft): Json<AmendmentDraft>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.create(draft, acting_user(&headers)) {
        Ok(amendment) => (StatusCode::CREATED, Json(amendment.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn amend_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path(amendment_id): Path<String>,
    headers: HeaderMap,
    Json(draft): Json<AmendmentDraft>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.amend(&AmendmentId(amendment_id), draft, acting_user(&headers)) {
        Ok(amendment) => (StatusCode::CREATED, Json(amendment.view())).into_response(),
        Err(err) => error_response(err),
    }
}

fn acting_user(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub(crate) async fn list_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Query(query): Query<ContractQuery>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.list_for_contract(&ContractId(query.contract_id)) {
        Ok(amendments) => {
            let views: Vec<_> = amendments.iter().map(|amendment| amendment.view()).collect();
            (StatusCode::OK, Json(views)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn get_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path(amendment_id): Path<String>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.get(&AmendmentId(amendment_id)) {
        Ok(amendment) => (StatusCode::OK, Json(amendment.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn update_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path(amendment_id): Path<String>,
    Json(draft): Json<AmendmentDraft>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.update(&AmendmentId(amendment_id), draft) {
        Ok(amendment) => (StatusCode::OK, Json(amendment.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn delete_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path(amendment_id): Path<String>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.delete(&AmendmentId(amendment_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path(amendment_id): Path<String>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.submit(&AmendmentId(amendment_id)) {
        Ok(amendment) => (StatusCode::OK, Json(amendment.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn validate_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path(amendment_id): Path<String>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.validate(&AmendmentId(amendment_id)) {
        Ok(amendment) => (StatusCode::OK, Json(amendment.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn generate_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path(amendment_id): Path<String>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.generate_document(&AmendmentId(amendment_id)) {
        Ok((_, document)) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                document.reference.file_name
            );
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, document.reference.content_type),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                document.bytes,
            )
                .into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn upload_signed_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path(amendment_id): Path<String>,
    Json(upload): Json<SignedDocumentUpload>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.attach_signed(&AmendmentId(amendment_id), upload) {
        Ok(amendment) => (StatusCode::OK, Json(amendment.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn defaults_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path((contract_id, category)): Path<(String, String)>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    let Some(category) = ModificationCategory::parse(&category) else {
        let payload = json!({ "error": format!("unknown modification category `{category}`") });
        return (StatusCode::BAD_REQUEST, Json(payload)).into_response();
    };

    match service.defaults(&ContractId(contract_id), category) {
        Ok(defaults) => (StatusCode::OK, Json(defaults)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn export_handler<C, R, D>(
    State(service): State<Arc<AmendmentService<C, R, D>>>,
    Path(contract_id): Path<String>,
) -> Response
where
    C: ContractDirectory + 'static,
    R: AmendmentRepository + 'static,
    D: DocumentStore + 'static,
{
    match service.export_register(&ContractId(contract_id)) {
        Ok(register) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string())],
            register,
        )
            .into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: AmendmentError) -> Response {
    let status = err.status_code();
    if status.is_server_error() {
        warn!(error = %err, "amendment request failed");
    }
    let payload = json!({ "error": err.to_string() });
    (status, Json(payload)).into_response()
}
