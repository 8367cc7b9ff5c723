//! Maintenance-mode middleware.
//!
//! When enabled, every request behind this layer answers 503 with the
//! JSON error envelope. The health probe is mounted outside the layer.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::ApiError;

#[derive(Clone)]
pub struct MaintenanceState {
    pub enabled: bool,
}

pub async fn maintenance_gate(
    State(state): State<MaintenanceState>,
    request: Request,
    next: Next,
) -> Response {
    if state.enabled {
        return ApiError::service_unavailable("Service temporarily unavailable for maintenance")
            .into_response();
    }
    next.run(request).await
}
