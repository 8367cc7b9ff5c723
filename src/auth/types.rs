//! Authentication user types.

use crate::jwt::AccessClaims;

/// Authenticated caller derived from a verified bearer token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// Verified token claims
    pub claims: AccessClaims,
}

impl AuthenticatedUser {
    /// The caller's email, as carried in the verified claims.
    pub fn email(&self) -> &str {
        &self.claims.email
    }
}
