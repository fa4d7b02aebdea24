// --- File: crates/careline_config/src/models.rs ---

use serde::{Deserialize, Serialize};

/// Default Google Calendar v3 REST root.
pub const DEFAULT_GCAL_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
/// Default lifetime of an issued access token (matches the legacy one hour).
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;
/// Default bcrypt work factor.
pub const DEFAULT_BCRYPT_COST: u32 = 12;
/// Default expiry of cached user profile lookups.
pub const DEFAULT_USER_CACHE_TTL_SECONDS: u64 = 60;

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. CARELINE__DATABASE__URL or legacy DATABASE_URI
}

/// How partial calendar updates treat fields the caller did not set.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum UpdateMode {
    /// Unset fields are left out of the PATCH body.
    #[default]
    OmitUnset,
    /// Legacy behaviour: unset fields are sent as empty strings.
    /// Only meant for compatibility testing, it clears fields on the provider.
    CoerceEmpty,
}

// --- Google Calendar Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct GcalConfig {
    pub api_base_url: Option<String>,
    pub api_key: Option<String>, // Secret: GOOGLE_CALENDAR_API_KEY
    pub calendar_id: Option<String>, // Legacy: CALENDAR_ID
    #[serde(default)]
    pub update_mode: UpdateMode,
}

impl GcalConfig {
    pub fn base_url(&self) -> &str {
        self.api_base_url
            .as_deref()
            .unwrap_or(DEFAULT_GCAL_API_BASE_URL)
    }
}

// --- Auth Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String, // Secret: JWT_SECRET_KEY
    pub token_ttl_minutes: Option<i64>,
    pub bcrypt_cost: Option<u32>,
}

impl AuthConfig {
    pub fn token_ttl_minutes(&self) -> i64 {
        self.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES)
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost.unwrap_or(DEFAULT_BCRYPT_COST)
    }
}

// --- Cache Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct CacheConfig {
    pub user_ttl_seconds: Option<u64>,
}

impl CacheConfig {
    pub fn user_ttl_seconds(&self) -> u64 {
        self.user_ttl_seconds
            .unwrap_or(DEFAULT_USER_CACHE_TTL_SECONDS)
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    // --- Runtime Flags ---
    #[serde(default)]
    pub use_gcal: bool,

    // --- Optional Sections ---
    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub auth: Option<AuthConfig>,
    #[serde(default)]
    pub cache: CacheConfig,
}
