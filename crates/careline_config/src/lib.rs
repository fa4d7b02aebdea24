// --- File: crates/careline_config/src/lib.rs ---
//! Layered configuration for Careline.
//!
//! The configuration is loaded once at process start and passed explicitly to
//! the calendar client and the backend. See [`load_config`] for the layers.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::PathBuf;
use tracing::debug;

pub mod env_vars;
pub mod models;

pub use models::*;

/// Loads the application configuration.
///
/// Layers, later ones win:
/// 1. `{CONFIG_DIR}/default.*` (optional, `CONFIG_DIR` defaults to `config`)
/// 2. `{CONFIG_DIR}/{RUN_ENV}.*` (optional, `RUN_ENV` defaults to `debug`)
/// 3. `CARELINE__SECTION__KEY` environment variables
/// 4. `"secret_from_env"` markers resolved from the environment
/// 5. legacy variables (`GOOGLE_CALENDAR_API_KEY`, `CALENDAR_ID`,
///    `JWT_SECRET_KEY`, `DATABASE_URI`)
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env_vars::get_config_prefix();
    let config_dir = PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    let default_path = config_dir.join("default");
    let env_path = config_dir.join(&run_env);
    debug!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let raw: Value = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(
            Environment::with_prefix(&prefix)
                .separator(env_vars::CONFIG_SEPARATOR)
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    let lookup = |name: &str| env::var(name).ok();
    resolve_config(raw, &lookup)
}

/// Turns a raw configuration tree into an [`AppConfig`], resolving secrets and
/// legacy variables through `lookup`.
pub fn resolve_config<F>(mut raw: Value, lookup: &F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if raw.is_null() {
        raw = Value::Object(serde_json::Map::new());
    }
    env_vars::inject_env_vars_with(&mut raw, lookup);
    let applied = env_vars::apply_legacy_env_vars_with(&mut raw, lookup);
    if applied > 0 {
        debug!("Applied {} legacy environment overrides", applied);
    }

    // Back through `config` so env values parsed as numbers or booleans still
    // land in string fields.
    Config::builder()
        .add_source(Config::try_from(&raw)?)
        .build()?
        .try_deserialize()
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process.
///
/// The path is `DOTENV_OVERRIDE` if set, otherwise `.env`. A missing file is
/// not an error. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = std::env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
