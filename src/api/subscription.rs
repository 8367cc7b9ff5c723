//! Subscription API endpoints.

use axum::{
    Json, Router, extract::State, middleware, response::IntoResponse, routing::get,
};
use serde::Serialize;
use std::sync::Arc;

use super::error::{ApiError, ResultExt};
use crate::access::AccessService;
use crate::auth::Auth;
use crate::db::SubscriptionRecord;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::rate_limit::{RateLimitConfig, rate_limit_auth_check};

/// State for subscription endpoints.
#[derive(Clone)]
pub struct SubscriptionState {
    pub jwt: Arc<JwtConfig>,
    pub access: AccessService,
}

impl_has_auth_backend!(SubscriptionState);

pub fn router(state: SubscriptionState, limits: &Arc<RateLimitConfig>) -> Router {
    Router::new()
        .route("/check-access", get(check_access))
        .route("/get", get(get_subscription))
        .layer(middleware::from_fn_with_state(
            limits.clone(),
            rate_limit_auth_check,
        ))
        .with_state(state)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckAccessResponse {
    has_access: bool,
}

/// The access predicate for the authenticated caller, served from the
/// cache when fresh. Always 200 for authenticated callers, access or not.
async fn check_access(State(state): State<SubscriptionState>, Auth(user): Auth) -> impl IntoResponse {
    let has_access = state.access.check_access(user.email()).await;
    Json(CheckAccessResponse { has_access })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetSubscriptionResponse {
    subscription: SubscriptionRecord,
}

/// The raw subscription record for the authenticated caller.
/// 404 when none exists; backing-store failures surface as 500.
async fn get_subscription(
    State(state): State<SubscriptionState>,
    Auth(user): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state
        .access
        .get_subscription(user.email())
        .await
        .db_err("Failed to read subscription")?
        .ok_or_else(|| ApiError::not_found("No subscription found"))?;

    Ok(Json(GetSubscriptionResponse { subscription }))
}
