// --- File: crates/careline_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod models; // Shared records
pub mod services; // Service abstractions

// Re-export error types and utilities for easier access
pub use error::{
    already_exists, config_error, external_service_error, internal_error, not_found,
    unauthorized, validation_error, ClinicError, HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{
    client::{create_client, default_client, DEFAULT_TIMEOUT_SECS},
    extract::{ApiJson, ApiPath, ApiQuery},
    IntoHttpResponse,
};

pub use logging::{init, init_with_level, log_result};
