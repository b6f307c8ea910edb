//! Error types for authentication operations

/// Errors that can occur while loading credentials or signing requests
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Environment variable not set
    #[error("Environment variable not set: {0}")]
    EnvVarNotSet(String),

    /// Signing requires a secret key but none is configured
    #[error("Secret key required to sign requests")]
    MissingSecretKey,

    /// Request body cannot be read back for signing (streaming body)
    #[error("Request body cannot be signed: {0}")]
    UnsignableBody(String),
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
