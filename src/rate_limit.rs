//! Per-route-class rate limiting.
//!
//! Token bucket limiters keyed by client IP, one per route class.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{Quota, RateLimiter, clock::DefaultClock, state::keyed::DefaultKeyedStateStore};
use std::{num::NonZeroU32, sync::Arc, time::Duration};

use crate::api::ApiError;
use crate::auth::extract_client_ip;

/// Per-IP keyed limiter.
pub type IpLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

/// Rate limiting configuration, one limiter per route class.
/// Constructed once at startup and injected via `ServerConfig`.
#[derive(Clone)]
pub struct RateLimitConfig {
    /// Authenticated read endpoints (generous: 10 requests per second)
    pub auth_check: Arc<IpLimiter>,
    /// Admin mutations (strict: 1 per second with a burst of 5)
    pub mutation: Arc<IpLimiter>,
    /// Payment webhook deliveries (30 per minute)
    pub webhook: Arc<IpLimiter>,
    /// Trusted proxy header to read the client IP from, if any
    pub forwarded_ip_header: Option<String>,
}

const AUTH_CHECK_PER_SEC: u32 = 10;
const MUTATION_BURST: u32 = 5;
const WEBHOOK_PER_MIN: u32 = 30;

impl RateLimitConfig {
    /// Create rate limiters with the default quotas.
    pub fn new(forwarded_ip_header: Option<String>) -> Self {
        Self::with_quotas(
            forwarded_ip_header,
            Quota::per_second(NonZeroU32::new(AUTH_CHECK_PER_SEC).unwrap()),
            Quota::per_second(NonZeroU32::new(1).unwrap())
                .allow_burst(NonZeroU32::new(MUTATION_BURST).unwrap()),
            Quota::per_minute(NonZeroU32::new(WEBHOOK_PER_MIN).unwrap()),
        )
    }

    /// Create rate limiters with explicit quotas (used by tests).
    pub fn with_quotas(
        forwarded_ip_header: Option<String>,
        auth_check: Quota,
        mutation: Quota,
        webhook: Quota,
    ) -> Self {
        Self {
            auth_check: Arc::new(RateLimiter::keyed(auth_check)),
            mutation: Arc::new(RateLimiter::keyed(mutation)),
            webhook: Arc::new(RateLimiter::keyed(webhook)),
            forwarded_ip_header,
        }
    }

    /// A configuration with quotas high enough to never trip. Test helper.
    pub fn generous(forwarded_ip_header: Option<String>) -> Self {
        let quota = Quota::per_second(NonZeroU32::new(10_000).unwrap());
        Self::with_quotas(forwarded_ip_header, quota, quota, quota)
    }
}

/// The retry interval suggested to rate-limited callers.
const RETRY_AFTER: Duration = Duration::from_secs(1);

fn check(
    limiter: &IpLimiter,
    config: &RateLimitConfig,
    request: &Request,
    message: &str,
) -> Result<(), Response> {
    let ip = match extract_client_ip(request, config.forwarded_ip_header.as_deref()) {
        Ok(ip) => ip,
        Err(_) => {
            return Err(ApiError::forbidden("Unable to determine client IP").into_response());
        }
    };

    match limiter.check_key(&ip) {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut response = ApiError::too_many_requests(message).into_response();
            if let Ok(value) = RETRY_AFTER.as_secs().to_string().parse() {
                response.headers_mut().insert("retry-after", value);
            }
            Err(response)
        }
    }
}

/// Middleware for rate limiting authenticated read endpoints.
pub async fn rate_limit_auth_check(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    match check(
        &config.auth_check,
        &config,
        &request,
        "Too many requests. Please try again later.",
    ) {
        Ok(()) => next.run(request).await,
        Err(response) => response,
    }
}

/// Middleware for rate limiting admin mutations.
pub async fn rate_limit_mutation(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    match check(
        &config.mutation,
        &config,
        &request,
        "Too many changes. Please wait before trying again.",
    ) {
        Ok(()) => next.run(request).await,
        Err(response) => response,
    }
}

/// Middleware for rate limiting webhook deliveries.
pub async fn rate_limit_webhook(
    State(config): State<Arc<RateLimitConfig>>,
    request: Request,
    next: Next,
) -> Response {
    match check(
        &config.webhook,
        &config,
        &request,
        "Too many deliveries. Please retry later.",
    ) {
        Ok(()) => next.run(request).await,
        Err(response) => response,
    }
}
