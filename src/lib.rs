pub mod access;
pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod jwt;
pub mod maintenance;
pub mod rate_limit;

use access::AccessService;
use api::create_api_router;
use axum::Router;
use db::Database;
use jwt::JwtConfig;
use rate_limit::RateLimitConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct ServerConfig {
    /// Database connection (cloneable, uses connection pool internally)
    pub db: Database,
    /// Shared secret for verifying bearer tokens
    pub jwt_secret: Vec<u8>,
    /// Shared secret expected from the payment provider's webhook deliveries
    pub webhook_secret: String,
    /// Rate limiting configuration (quotas + client IP extraction)
    pub rate_limits: RateLimitConfig,
    /// Whether the API answers 503 for everything but the health probe
    pub maintenance: bool,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let jwt = Arc::new(JwtConfig::new(&config.jwt_secret));
    let access = AccessService::new(config.db.clone());

    let api_router = create_api_router(
        config.db.clone(),
        jwt,
        access,
        Arc::new(config.rate_limits.clone()),
        config.webhook_secret.clone(),
        config.maintenance,
    );

    Router::new().nest("/api", api_router)
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    let make_service = app.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, make_service).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
/// Note: For production use, prefer `run_server` directly in main.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> (tokio::task::JoinHandle<()>, SocketAddr) {
    let addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&addr).await.expect("Failed to bind");
    let local_addr = listener.local_addr().expect("Failed to get local address");

    let handle = tokio::spawn(async move {
        run_server(config, listener).await.ok();
    });

    (handle, local_addr)
}
