// --- File: crates/services/careline_backend/src/error.rs ---
use axum::response::{IntoResponse, Response};
use careline_common::{internal_error, ClinicError};
use thiserror::Error;

/// Authentication and credential errors.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Missing, malformed, invalid or expired bearer token.
    #[error("Missing or invalid bearer token")]
    MissingOrInvalidToken,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error("Token creation failed: {0}")]
    TokenCreation(String),

    #[error("Auth configuration error: {0}")]
    Config(String),
}

impl From<AuthError> for ClinicError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingOrInvalidToken | AuthError::InvalidCredentials => {
                ClinicError::AuthError(err.to_string())
            }
            AuthError::Config(msg) => ClinicError::ConfigError(msg),
            other => internal_error(other),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        ClinicError::from(self).into_response()
    }
}
