// --- File: crates/careline_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// The base error type shared by all Careline crates.
///
/// Each crate keeps its own error enum and implements `From<ItsError>` for
/// `ClinicError`, which is what reaches the HTTP boundary.
#[derive(Error, Debug)]
pub enum ClinicError {
    /// Error occurred during an HTTP request
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    /// Error occurred while parsing data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Missing, malformed, invalid or expired credentials
    #[error("{0}")]
    AuthError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred during external service call
    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    /// A unique resource (e.g. a username) is already taken.
    /// Reported as 400 to match the legacy API contract.
    #[error("{0}")]
    AlreadyExists(String),

    /// Error occurred due to a resource not being found
    #[error("{0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ClinicError {
    fn status_code(&self) -> u16 {
        match self {
            ClinicError::HttpError(_) => 500,
            ClinicError::ParseError(_) => 400,
            ClinicError::ConfigError(_) => 500,
            ClinicError::AuthError(_) => 401,
            ClinicError::ValidationError(_) => 400,
            ClinicError::DatabaseError(_) => 500,
            ClinicError::ExternalServiceError { .. } => 502,
            ClinicError::AlreadyExists(_) => 400,
            ClinicError::NotFoundError(_) => 404,
            ClinicError::InternalError(_) => 500,
        }
    }
}

// Common error conversions
impl From<reqwest::Error> for ClinicError {
    fn from(err: reqwest::Error) -> Self {
        ClinicError::HttpError(err.to_string())
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(err: serde_json::Error) -> Self {
        ClinicError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for ClinicError {
    fn from(err: std::io::Error) -> Self {
        ClinicError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::NotFoundError(message.to_string())
}

pub fn already_exists<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::AlreadyExists(message.to_string())
}

pub fn unauthorized<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::AuthError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> ClinicError {
    ClinicError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> ClinicError {
    ClinicError::InternalError(message.to_string())
}
