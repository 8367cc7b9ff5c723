//! Payment provider webhook.
//!
//! The payment provider confirms checkouts, renewals and cancellations by
//! delivering an event here. Deliveries are authenticated with a shared
//! secret header, not a bearer token.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
    middleware,
    response::IntoResponse,
    routing::post,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt, validate_email};
use crate::access::AccessService;
use crate::rate_limit::{RateLimitConfig, rate_limit_webhook};

/// Header carrying the shared webhook secret.
pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// State for the payments webhook.
#[derive(Clone)]
pub struct PaymentsState {
    pub access: AccessService,
    pub webhook_secret: String,
}

pub fn router(state: PaymentsState, limits: &Arc<RateLimitConfig>) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .layer(middleware::from_fn_with_state(
            limits.clone(),
            rate_limit_webhook,
        ))
        .with_state(state)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebhookRequest {
    email: String,
    /// Provider customer id; minted locally when the provider omits it.
    customer_id: Option<String>,
    expiration_date: DateTime<Utc>,
    /// Defaults to true: most deliveries confirm a purchase or renewal.
    #[serde(default = "default_active")]
    active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Serialize)]
struct WebhookResponse {
    received: bool,
}

/// Record a payment confirmation. Upserts the subscription record and
/// evicts the cached access result for the email.
async fn webhook(
    State(state): State<PaymentsState>,
    headers: HeaderMap,
    body: Result<Json<WebhookRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let provided = headers
        .get(WEBHOOK_SECRET_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Missing webhook secret"))?;

    if provided != state.webhook_secret {
        return Err(ApiError::unauthorized("Invalid webhook secret"));
    }

    let Json(request) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;
    validate_email(&request.email)?;

    let customer_id = request
        .customer_id
        .unwrap_or_else(|| format!("cus_{}", uuid::Uuid::new_v4()));

    state
        .access
        .record_subscription(
            &request.email,
            &customer_id,
            request.expiration_date,
            request.active,
        )
        .await
        .db_err("Failed to record subscription")?;

    Ok(Json(WebhookResponse { received: true }))
}
