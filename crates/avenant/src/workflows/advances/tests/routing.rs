use super::common::*;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use tower::ServiceExt;

use crate::workflows::advances::router::refuse_handler;
use crate::workflows::advances::{
    advance_router, AdvanceRepository, AdvanceStatus, RefusalRequest,
};

fn post_json(uri: &str, body: &impl serde::Serialize) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body).expect("serialize body")))
        .expect("request")
}

#[tokio::test]
async fn create_route_enforces_quota() {
    let (service, _) = build_service(Some(1));
    let router = advance_router(Arc::new(service));

    let created = router
        .clone()
        .oneshot(post_json("/avances", &submission(3)))
        .await
        .expect("router responds");
    assert_eq!(created.status(), StatusCode::CREATED);
    let body = read_json_body(created).await;
    assert_eq!(body["status"], "draft");
    assert_eq!(body["kind"], "avance");

    let refused = router
        .oneshot(post_json("/avances", &submission(4)))
        .await
        .expect("router responds");
    assert_eq!(refused.status(), StatusCode::CONFLICT);
    let body = read_json_body(refused).await;
    assert!(body["error"]
        .as_str()
        .expect("error message")
        .contains("limit"));
}

#[tokio::test]
async fn eligibility_route_reports_remaining_quota() {
    let (service, _) = build_service(Some(5));
    for day in 1..=5 {
        service.create(submission(day)).expect("created");
    }
    let router = advance_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get("/avances/eligibility/emp-021?date=2025-11-30")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json_body(response).await;
    assert_eq!(body["remaining"], 0);
    assert_eq!(body["reached_max"], true);
    assert_eq!(body["max_per_year"], 5);
}

#[tokio::test]
async fn max_route_exposes_configured_cap() {
    let (service, _) = build_service(None);
    let router = advance_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get("/parametres/max-avances")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");

    let body = read_json_body(response).await;
    assert!(body["max_avances_par_an"].is_null());
}

#[tokio::test]
async fn refuse_handler_rejects_draft_requests() {
    let (service, repository) = build_service(Some(5));
    let draft = stored_request(AdvanceStatus::Draft);
    repository.seed(draft.clone());

    let response = refuse_handler::<MemoryAdvances>(
        State(Arc::new(service)),
        Path(draft.id.0.clone()),
        axum::Json(RefusalRequest {
            reason: "Plafond atteint".to_string(),
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn unknown_request_returns_not_found() {
    let (service, _) = build_service(Some(5));
    let router = advance_router(Arc::new(service));

    let response = router
        .oneshot(
            Request::get("/avances/adv-404")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router responds");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
