//! Authentication and role API endpoints.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt, validate_email};
use crate::access::AccessService;
use crate::auth::{AdminAuth, Auth};
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::rate_limit::{RateLimitConfig, rate_limit_auth_check, rate_limit_mutation};

/// State for auth endpoints.
#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<JwtConfig>,
    pub access: AccessService,
}

impl_has_auth_backend!(AuthState);

pub fn router(state: AuthState, limits: &Arc<RateLimitConfig>) -> Router {
    let reads = Router::new()
        .route("/status", get(status))
        .route("/verify-admin", get(verify_admin))
        .layer(middleware::from_fn_with_state(
            limits.clone(),
            rate_limit_auth_check,
        ))
        .with_state(state.clone());

    let writes = Router::new()
        .route("/set-role", post(set_role))
        .route("/reset-claims", post(reset_claims))
        .layer(middleware::from_fn_with_state(
            limits.clone(),
            rate_limit_mutation,
        ))
        .with_state(state);

    reads.merge(writes)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    has_access: bool,
    subscription_status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
    email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_updated: Option<DateTime<Utc>>,
}

/// Current subscription standing for the authenticated caller,
/// read fresh from the subscription record.
async fn status(
    State(state): State<AuthState>,
    Auth(user): Auth,
) -> Result<impl IntoResponse, ApiError> {
    let subscription = state
        .access
        .get_subscription(user.email())
        .await
        .db_err("Failed to read subscription")?;

    let response = match subscription {
        Some(sub) => {
            let now = Utc::now();
            let subscription_status = if sub.grants_access_at(now) {
                "active"
            } else if !sub.active {
                "canceled"
            } else {
                "expired"
            };
            StatusResponse {
                has_access: sub.grants_access_at(now),
                subscription_status,
                expires_at: Some(sub.expiration_date),
                email: sub.email,
                last_updated: Some(sub.updated_at),
            }
        }
        None => StatusResponse {
            has_access: false,
            subscription_status: "none",
            expires_at: None,
            email: user.email().to_string(),
            last_updated: None,
        },
    };

    Ok(Json(response))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyAdminResponse {
    is_admin: bool,
}

/// Report whether the authenticated caller holds the admin role.
/// Authenticated non-admins get a 200 with `isAdmin: false`.
async fn verify_admin(State(state): State<AuthState>, Auth(user): Auth) -> impl IntoResponse {
    let is_admin = state.access.is_admin(user.email()).await;
    Json(VerifyAdminResponse { is_admin })
}

#[derive(Deserialize)]
struct SetRoleRequest {
    email: String,
    role: String,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

/// Grant or change a role. Admin only.
async fn set_role(
    State(state): State<AuthState>,
    _auth: AdminAuth,
    body: Result<Json<SetRoleRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    validate_email(&request.email)?;
    let role = crate::db::Role::parse(&request.role)
        .ok_or_else(|| ApiError::bad_request("Role must be 'admin' or 'customer'"))?;

    let success = state.access.set_role(&request.email, role).await;
    Ok(Json(SuccessResponse { success }))
}

#[derive(Deserialize)]
struct ResetClaimsRequest {
    email: String,
}

/// Clear a user's role record and cached access result. Admin only.
async fn reset_claims(
    State(state): State<AuthState>,
    _auth: AdminAuth,
    body: Result<Json<ResetClaimsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    validate_email(&request.email)?;

    let success = state.access.reset_claims(&request.email).await;
    Ok(Json(SuccessResponse { success }))
}
