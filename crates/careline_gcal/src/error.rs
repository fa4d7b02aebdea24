// --- File: crates/careline_gcal/src/error.rs ---
use careline_common::{external_service_error, ClinicError};
use thiserror::Error;

/// Errors from the calendar provider or from setting up the client.
#[derive(Error, Debug)]
pub enum GcalError {
    /// The provider answered with a status other than the expected one.
    /// `message` is the provider's own error text.
    #[error("Google Calendar API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Request to Google Calendar failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Calendar configuration error: {0}")]
    Config(String),

    #[error("Unexpected Google Calendar response: {0}")]
    Parse(String),
}

impl GcalError {
    /// The provider status code, if the provider answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            GcalError::Api { status, .. } => Some(*status),
            GcalError::Request(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

impl From<GcalError> for ClinicError {
    fn from(err: GcalError) -> Self {
        match err {
            GcalError::Config(msg) => ClinicError::ConfigError(msg),
            other => external_service_error("Google Calendar", other),
        }
    }
}
