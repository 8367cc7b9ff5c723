mod common;

use axum::http::StatusCode;
use common::*;
use tower::ServiceExt;

#[tokio::test]
async fn test_maintenance_answers_503() {
    let (app, _db) = create_test_app_with(TestOptions {
        maintenance: true,
        ..Default::default()
    })
    .await;
    let token = token_for("u@x.com");

    let response = app
        .clone()
        .oneshot(get("/api/subscription/check-access", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert!(json["error"].is_string());

    // Unauthenticated requests get the same answer.
    let response = app
        .oneshot(get("/api/auth/status", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_stays_up_during_maintenance() {
    let (app, _db) = create_test_app_with(TestOptions {
        maintenance: true,
        ..Default::default()
    })
    .await;

    let response = app.oneshot(get("/api/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_api_serves_normally_without_maintenance() {
    let (app, _db) = create_test_app().await;
    let token = token_for("u@x.com");

    let response = app
        .oneshot(get("/api/subscription/check-access", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
