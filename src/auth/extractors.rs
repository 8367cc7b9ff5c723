//! Axum extractors for authentication and admin authorization.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::bearer::bearer_token;
use super::errors::{ApiAuthError, AuthErrorKind};
use super::state::HasAuthBackend;
use super::types::AuthenticatedUser;

/// Core authentication: parse the bearer token and verify it.
/// Pure claim verification, no backing-store access.
fn authenticate_request<S>(parts: &Parts, state: &S) -> Result<AuthenticatedUser, AuthErrorKind>
where
    S: HasAuthBackend,
{
    let token = bearer_token(&parts.headers).ok_or(AuthErrorKind::NotAuthenticated)?;

    let claims = state
        .jwt()
        .verify_token(token)
        .map_err(|_| AuthErrorKind::InvalidToken)?;

    Ok(AuthenticatedUser { claims })
}

/// Outcome of the admin gate. Keeps "no valid credential" and
/// "authenticated but not admin" distinguishable so callers map them to
/// 401 and 403 unambiguously.
pub enum AdminGate {
    Unauthenticated(AuthErrorKind),
    Forbidden,
    Authorized(AuthenticatedUser),
}

/// Verify the caller's token, then resolve the admin role against the
/// role records. Token claims alone never grant admin.
pub async fn admin_gate<S>(parts: &Parts, state: &S) -> AdminGate
where
    S: HasAuthBackend,
{
    let user = match authenticate_request(parts, state) {
        Ok(user) => user,
        Err(kind) => return AdminGate::Unauthenticated(kind),
    };

    if state.access().is_admin(user.email()).await {
        AdminGate::Authorized(user)
    } else {
        AdminGate::Forbidden
    }
}

/// Extractor for endpoints that require a valid bearer token.
/// Rejects with 401 and the JSON error envelope.
pub struct Auth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for Auth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authenticate_request(parts, state)
            .map(Auth)
            .map_err(ApiAuthError::new)
    }
}

/// Extractor for admin-only endpoints. The handler body never runs for
/// unauthenticated (401) or non-admin (403) callers.
pub struct AdminAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminAuth
where
    S: HasAuthBackend + Send + Sync,
{
    type Rejection = ApiAuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match admin_gate(parts, state).await {
            AdminGate::Authorized(user) => Ok(AdminAuth(user)),
            AdminGate::Unauthenticated(kind) => Err(ApiAuthError::new(kind)),
            AdminGate::Forbidden => Err(ApiAuthError::new(AuthErrorKind::InsufficientRole)),
        }
    }
}
