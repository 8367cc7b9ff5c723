//! Content template API endpoints.
//!
//! Reads require an active subscription (or the admin role); writes are
//! admin only.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    middleware,
    response::IntoResponse,
    routing::{get, put},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{ApiError, ResultExt, validate_slug};
use crate::access::AccessService;
use crate::auth::{AdminAuth, Auth, AuthenticatedUser};
use crate::db::Database;
use crate::impl_has_auth_backend;
use crate::jwt::JwtConfig;
use crate::rate_limit::{RateLimitConfig, rate_limit_auth_check, rate_limit_mutation};

/// State for template endpoints.
#[derive(Clone)]
pub struct TemplatesState {
    pub db: Database,
    pub jwt: Arc<JwtConfig>,
    pub access: AccessService,
}

impl_has_auth_backend!(TemplatesState);

pub fn router(state: TemplatesState, limits: &Arc<RateLimitConfig>) -> Router {
    let reads = Router::new()
        .route("/", get(list_templates))
        .route("/{slug}", get(get_template))
        .layer(middleware::from_fn_with_state(
            limits.clone(),
            rate_limit_auth_check,
        ))
        .with_state(state.clone());

    let writes = Router::new()
        .route("/{slug}", put(upsert_template).delete(delete_template))
        .layer(middleware::from_fn_with_state(
            limits.clone(),
            rate_limit_mutation,
        ))
        .with_state(state);

    reads.merge(writes)
}

/// Template content is part of the paid product: readable with an active
/// subscription or the admin role.
async fn require_read_access(
    state: &TemplatesState,
    user: &AuthenticatedUser,
) -> Result<(), ApiError> {
    if state.access.check_access(user.email()).await || state.access.is_admin(user.email()).await {
        Ok(())
    } else {
        Err(ApiError::forbidden("Subscription required"))
    }
}

async fn list_templates(
    State(state): State<TemplatesState>,
    Auth(user): Auth,
) -> Result<impl IntoResponse, ApiError> {
    require_read_access(&state, &user).await?;

    let templates = state
        .db
        .templates()
        .list()
        .await
        .db_err("Failed to list templates")?;

    Ok(Json(templates))
}

async fn get_template(
    State(state): State<TemplatesState>,
    Auth(user): Auth,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    require_read_access(&state, &user).await?;

    let template = state
        .db
        .templates()
        .get(&slug)
        .await
        .db_err("Failed to read template")?
        .ok_or_else(|| ApiError::not_found("Template not found"))?;

    Ok(Json(template))
}

#[derive(Deserialize)]
struct UpsertTemplateRequest {
    title: String,
    body: String,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

/// Create or replace a template. Admin only.
async fn upsert_template(
    State(state): State<TemplatesState>,
    _auth: AdminAuth,
    Path(slug): Path<String>,
    body: Result<Json<UpsertTemplateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    validate_slug(&slug)?;
    let Json(request) = body.map_err(|_| ApiError::bad_request("Invalid request body"))?;

    if request.title.trim().is_empty() {
        return Err(ApiError::bad_request("Title cannot be empty"));
    }

    state
        .db
        .templates()
        .upsert(&slug, request.title.trim(), &request.body)
        .await
        .db_err("Failed to write template")?;

    Ok(Json(SuccessResponse { success: true }))
}

/// Delete a template. Admin only.
async fn delete_template(
    State(state): State<TemplatesState>,
    _auth: AdminAuth,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    validate_slug(&slug)?;

    let deleted = state
        .db
        .templates()
        .delete(&slug)
        .await
        .db_err("Failed to delete template")?;

    if !deleted {
        return Err(ApiError::not_found("Template not found"));
    }

    Ok(Json(SuccessResponse { success: true }))
}
