mod auth;
mod error;
mod payments;
mod subscription;
mod templates;

use axum::{Json, Router, middleware, response::IntoResponse, routing::get};
use std::sync::Arc;

use crate::access::AccessService;
use crate::db::Database;
use crate::jwt::JwtConfig;
use crate::maintenance::{MaintenanceState, maintenance_gate};
use crate::rate_limit::RateLimitConfig;

pub use error::{ApiError, ResultExt};
pub use payments::WEBHOOK_SECRET_HEADER;

/// Create the API router.
pub fn create_api_router(
    db: Database,
    jwt: Arc<JwtConfig>,
    access: AccessService,
    limits: Arc<RateLimitConfig>,
    webhook_secret: String,
    maintenance: bool,
) -> Router {
    let auth_state = auth::AuthState {
        jwt: jwt.clone(),
        access: access.clone(),
    };

    let subscription_state = subscription::SubscriptionState {
        jwt: jwt.clone(),
        access: access.clone(),
    };

    let payments_state = payments::PaymentsState {
        access: access.clone(),
        webhook_secret,
    };

    let templates_state = templates::TemplatesState { db, jwt, access };

    let gated = Router::new()
        .nest("/auth", auth::router(auth_state, &limits))
        .nest("/subscription", subscription::router(subscription_state, &limits))
        .nest("/payments", payments::router(payments_state, &limits))
        .nest("/templates", templates::router(templates_state, &limits))
        .layer(middleware::from_fn_with_state(
            MaintenanceState {
                enabled: maintenance,
            },
            maintenance_gate,
        ));

    // The health probe sits outside the maintenance gate and rate limits.
    Router::new().route("/health", get(health)).merge(gated)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
