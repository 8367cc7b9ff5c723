//! Authentication state trait and macro.

use crate::access::AccessService;
use crate::jwt::JwtConfig;

/// Trait for state types that provide token verification and access
/// resolution for authentication.
pub trait HasAuthBackend {
    fn jwt(&self) -> &JwtConfig;
    fn access(&self) -> &AccessService;
}

/// Macro to implement `HasAuthBackend` for state structs with the
/// standard fields.
///
/// The struct must have these fields:
/// - `jwt: Arc<JwtConfig>`
/// - `access: AccessService`
///
/// # Example
/// ```ignore
/// use crate::impl_has_auth_backend;
///
/// #[derive(Clone)]
/// pub struct MyState {
///     pub jwt: Arc<JwtConfig>,
///     pub access: AccessService,
///     // ... other fields
/// }
///
/// impl_has_auth_backend!(MyState);
/// ```
#[macro_export]
macro_rules! impl_has_auth_backend {
    ($state_type:ty) => {
        impl $crate::auth::HasAuthBackend for $state_type {
            fn jwt(&self) -> &$crate::jwt::JwtConfig {
                &self.jwt
            }
            fn access(&self) -> &$crate::access::AccessService {
                &self.access
            }
        }
    };
}
