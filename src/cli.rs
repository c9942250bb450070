//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::clock::{MAX_TTL_SECS, SystemClock};
use crate::db::Database;
use crate::jwt::MIN_SECRET_LENGTH;
use clap::Parser;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "tokengate",
    about = "Password login with short-lived access tokens and stored refresh tokens"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "9898")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "tokengate.db")]
    pub database: String,

    /// Access token lifetime in seconds
    #[arg(long, env = "ACCESS_TOKEN_TTL_SECS", value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_SECS))]
    pub access_ttl: u64,

    /// Refresh token lifetime in seconds
    #[arg(long, env = "REFRESH_TOKEN_TTL_SECS", value_parser = clap::value_parser!(u64).range(1..=MAX_TTL_SECS))]
    pub refresh_ttl: u64,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Login and signup attempts allowed per client IP per minute
    #[arg(long, default_value = "10")]
    pub login_rate_per_minute: NonZeroU32,

    /// Grant a role to an existing user on startup, as USERNAME=ROLE. Repeatable
    #[arg(long = "grant-role", value_name = "USERNAME=ROLE", value_parser = parse_role_grant)]
    pub grant_roles: Vec<RoleGrant>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// A role to grant at startup. Signup never assigns roles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrant {
    pub username: String,
    pub role: String,
}

fn parse_role_grant(s: &str) -> Result<RoleGrant, String> {
    let Some((username, role)) = s.split_once('=') else {
        return Err(format!("Expected USERNAME=ROLE: {}", s));
    };

    let valid = |part: &str| {
        !part.is_empty() && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    };
    if !valid(username) || !valid(role) {
        return Err(format!(
            "Username and role can only contain letters, numbers, and underscores: {}",
            s
        ));
    }

    Ok(RoleGrant {
        username: username.to_string(),
        role: role.to_lowercase(),
    })
}

/// Initialize logging based on the specified format.
/// Filtering follows `RUST_LOG`, defaulting to `info`.
pub fn init_logging(format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} bytes. Use a longer secret",
            MIN_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Handle the --grant-role flags. Returns false and logs if any grant fails.
pub async fn handle_grant_roles(db: &Database, grants: &[RoleGrant]) -> bool {
    for grant in grants {
        let identity = match db.users().get_by_username(&grant.username).await {
            Ok(Some(identity)) => identity,
            Ok(None) => {
                error!(username = %grant.username, "Cannot grant role to unknown user");
                return false;
            }
            Err(e) => {
                error!(username = %grant.username, error = %e, "Failed to look up user");
                return false;
            }
        };

        if let Err(e) = db.users().add_role(identity.id, &grant.role).await {
            error!(username = %grant.username, role = %grant.role, error = %e, "Failed to grant role");
            return false;
        }
        info!(username = %grant.username, role = %grant.role, "Role granted");
    }
    true
}

/// Build ServerConfig from validated arguments, using the system clock.
pub fn build_config(args: &Args, db: Database, jwt_secret: String) -> ServerConfig {
    ServerConfig {
        db,
        jwt_secret: jwt_secret.into_bytes(),
        access_ttl: args.access_ttl,
        refresh_ttl: args.refresh_ttl,
        login_rate_per_minute: args.login_rate_per_minute,
        clock: Arc::new(SystemClock),
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
