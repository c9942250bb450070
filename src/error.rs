//! Authentication error taxonomy.

/// Failures of the login, signup and refresh flows.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Unknown username or wrong password at login.
    #[error("Invalid username or password")]
    AuthenticationFailure,
    /// Malformed, forged or unknown token.
    #[error("Invalid token")]
    TokenInvalid,
    /// Access or refresh token past its expiry.
    #[error("Token has expired")]
    TokenExpired,
    #[error("Identity not found")]
    IdentityNotFound,
    /// Signup with a username that is already taken.
    #[error("Username is already taken")]
    AlreadyExists,
    #[error("Storage failure: {0}")]
    Storage(#[from] sqlx::Error),
    /// Token signing failed; only possible with a broken key or serializer.
    #[error("Token issuance failed: {0}")]
    Issuance(#[from] crate::jwt::JwtError),
}

impl AuthError {
    /// Stable machine-readable kind, sent to clients alongside the message.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::AuthenticationFailure => "authentication_failure",
            AuthError::TokenInvalid => "token_invalid",
            AuthError::TokenExpired => "token_expired",
            AuthError::IdentityNotFound => "identity_not_found",
            AuthError::AlreadyExists => "already_exists",
            AuthError::Storage(_) => "storage_failure",
            AuthError::Issuance(_) => "internal_error",
        }
    }
}

/// Startup configuration the service cannot run with.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Signing(#[from] crate::jwt::JwtError),
    #[error(transparent)]
    RefreshTtl(#[from] crate::clock::TtlError),
}
