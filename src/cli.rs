//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::access::normalize_email;
use crate::db::{Database, Role};
use crate::rate_limit::RateLimitConfig;
use clap::Parser;
use tracing::{error, info};

const MIN_JWT_SECRET_LENGTH: usize = 32;
const MIN_WEBHOOK_SECRET_LENGTH: usize = 16;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "Quillgate", about = "Subscription-gated content service")]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8330")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "quillgate.db")]
    pub database: String,

    /// Path to file containing the JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Path to file containing the webhook secret. Prefer using WEBHOOK_SECRET env var instead
    #[arg(long)]
    pub webhook_secret_file: Option<String>,

    /// Grant the admin role to this email on startup, before serving
    #[arg(long, value_name = "EMAIL")]
    pub bootstrap_admin: Option<String>,

    /// Answer 503 for all API routes except the health probe
    #[arg(long, env = "MAINTENANCE_MODE")]
    pub maintenance: bool,

    /// Trusted proxy header to read the client IP from (e.g. "x-forwarded-for").
    /// Only set this when running behind a proxy
    #[arg(long)]
    pub forwarded_ip_header: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
pub fn init_logging(format: &LogFormat) {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt::init(),
        LogFormat::Json => tracing_subscriber::fmt().json().init(),
        LogFormat::Compact => tracing_subscriber::fmt().compact().init(),
    }
}

/// Load a secret from the named environment variable or a file.
/// Returns None and logs an error if the secret cannot be loaded.
fn load_secret(
    env_var: &str,
    secret_file: Option<&str>,
    flag: &str,
    min_length: usize,
) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var(env_var) {
        // Clear the environment variable to prevent leaking.
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var(env_var) };
        secret
    } else if let Some(path) = secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read secret file");
                return None;
            }
        }
    } else {
        error!(
            "{} is required. Set the {} environment variable (recommended) or use {}",
            env_var, env_var, flag
        );
        return None;
    };

    if secret.len() < min_length {
        error!(
            "{} is shorter than {} characters. Use a longer secret",
            env_var, min_length
        );
        return None;
    }

    Some(secret)
}

/// Load the JWT secret from the environment or a file.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    load_secret(
        "JWT_SECRET",
        jwt_secret_file,
        "--jwt-secret-file",
        MIN_JWT_SECRET_LENGTH,
    )
}

/// Load the webhook secret from the environment or a file.
pub fn load_webhook_secret(webhook_secret_file: Option<&str>) -> Option<String> {
    load_secret(
        "WEBHOOK_SECRET",
        webhook_secret_file,
        "--webhook-secret-file",
        MIN_WEBHOOK_SECRET_LENGTH,
    )
}

/// Handle the --bootstrap-admin flag: grant the admin role directly,
/// bypassing the admin-only API (there is no admin yet to call it).
pub async fn handle_bootstrap_admin(db: &Database, email: &str) {
    let email = normalize_email(email);
    if email.is_empty() || !email.contains('@') {
        error!(email = %email, "Invalid bootstrap admin email");
        std::process::exit(1);
    }

    match db.roles().upsert(&email, Role::Admin).await {
        Ok(()) => {
            info!(email = %email, "Admin role granted");
        }
        Err(e) => {
            error!(error = %e, "Failed to grant admin role");
            std::process::exit(1);
        }
    }
}

/// Build ServerConfig from validated arguments.
pub fn build_config(
    db: Database,
    jwt_secret: String,
    webhook_secret: String,
    maintenance: bool,
    forwarded_ip_header: Option<String>,
) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        webhook_secret,
        rate_limits: RateLimitConfig::new(forwarded_ip_header),
        maintenance,
    }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}
