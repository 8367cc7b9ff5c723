mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::*;
use quillgate::db::{Database, Role};
use serde_json::json;
use tower::ServiceExt;

async fn grant_subscription(db: &Database, email: &str) {
    db.subscriptions()
        .upsert(email, "cus_t", Utc::now() + Duration::days(30), true)
        .await
        .unwrap();
}

// --- reads ---

#[tokio::test]
async fn test_list_requires_auth() {
    let (app, _db) = create_test_app().await;

    let response = app.oneshot(get("/api/templates", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_requires_subscription() {
    let (app, _db) = create_test_app().await;
    let token = token_for("nosub@example.com");

    let response = app
        .oneshot(get("/api/templates", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_with_subscription() {
    let (app, db) = create_test_app().await;
    grant_subscription(&db, "u@x.com").await;
    let token = token_for("u@x.com");

    db.templates()
        .upsert("welcome", "Welcome letter", "Dear supporter,")
        .await
        .unwrap();

    let response = app
        .oneshot(get("/api/templates", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let list = json.as_array().expect("Response should be an array");
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["slug"], "welcome");
    assert_eq!(list[0]["title"], "Welcome letter");
    // Listing does not carry bodies.
    assert!(list[0].get("body").is_none());
}

#[tokio::test]
async fn test_admin_reads_without_subscription() {
    let (app, db) = create_test_app().await;

    db.roles()
        .upsert("root@example.com", Role::Admin)
        .await
        .unwrap();
    let token = token_for("root@example.com");

    let response = app
        .oneshot(get("/api/templates", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_get_template_by_slug() {
    let (app, db) = create_test_app().await;
    grant_subscription(&db, "u@x.com").await;
    let token = token_for("u@x.com");

    db.templates()
        .upsert("call-your-rep", "Call your representative", "Hello, my name is...")
        .await
        .unwrap();

    let response = app
        .oneshot(get("/api/templates/call-your-rep", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["slug"], "call-your-rep");
    assert_eq!(json["body"], "Hello, my name is...");
}

#[tokio::test]
async fn test_get_unknown_template_is_404() {
    let (app, db) = create_test_app().await;
    grant_subscription(&db, "u@x.com").await;
    let token = token_for("u@x.com");

    let response = app
        .oneshot(get("/api/templates/missing", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// --- writes ---

#[tokio::test]
async fn test_upsert_requires_admin() {
    let (app, db) = create_test_app().await;
    grant_subscription(&db, "u@x.com").await;
    let token = token_for("u@x.com");

    // A paying customer still cannot write.
    let response = app
        .clone()
        .oneshot(put_json(
            "/api/templates/welcome",
            Some(&token),
            json!({"title": "Welcome", "body": "..."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .oneshot(put_json(
            "/api/templates/welcome",
            None,
            json!({"title": "Welcome", "body": "..."}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    assert!(db.templates().get("welcome").await.unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_validates_input() {
    let (app, db) = create_test_app().await;

    db.roles()
        .upsert("root@example.com", Role::Admin)
        .await
        .unwrap();
    let token = token_for("root@example.com");

    // Slug with invalid characters.
    let response = app
        .clone()
        .oneshot(put_json(
            "/api/templates/Bad%20Slug",
            Some(&token),
            json!({"title": "x", "body": "y"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Empty title.
    let response = app
        .clone()
        .oneshot(put_json(
            "/api/templates/welcome",
            Some(&token),
            json!({"title": "  ", "body": "y"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing fields.
    let response = app
        .oneshot(put_json(
            "/api/templates/welcome",
            Some(&token),
            json!({"title": "x"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upsert_and_delete_flow() {
    let (app, db) = create_test_app().await;

    db.roles()
        .upsert("root@example.com", Role::Admin)
        .await
        .unwrap();
    let token = token_for("root@example.com");

    let response = app
        .clone()
        .oneshot(put_json(
            "/api/templates/welcome",
            Some(&token),
            json!({"title": "Welcome", "body": "Dear supporter,"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);

    let stored = db.templates().get("welcome").await.unwrap().unwrap();
    assert_eq!(stored.title, "Welcome");

    // Replace the body.
    let response = app
        .clone()
        .oneshot(put_json(
            "/api/templates/welcome",
            Some(&token),
            json!({"title": "Welcome", "body": "Dear member,"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let stored = db.templates().get("welcome").await.unwrap().unwrap();
    assert_eq!(stored.body, "Dear member,");

    let response = app
        .clone()
        .oneshot(delete("/api/templates/welcome", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(db.templates().get("welcome").await.unwrap().is_none());

    // Deleting again is a 404.
    let response = app
        .oneshot(delete("/api/templates/welcome", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
