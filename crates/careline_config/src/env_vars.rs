//! Environment variable handling for Careline.
//!
//! Naming scheme:
//! - plain settings: `CARELINE__SECTION__KEY`
//! - secrets: `CARELINE_SECRET_SECTION_KEY`, falling back to `SECTION_KEY`
//! - the variable names of the original deployment (`GOOGLE_CALENDAR_API_KEY`,
//!   `CALENDAR_ID`, `JWT_SECRET_KEY`, `DATABASE_URI`) override last.
//!
//! Every function that reads the environment has a `*_with` twin taking a
//! lookup closure, so the mapping can be tested without touching process state.

use serde_json::{Map, Value};
use std::env;
use tracing::warn;

/// The default prefix for configuration environment variables
pub const DEFAULT_PREFIX: &str = "CARELINE";

/// The prefix for secret environment variables
pub const SECRET_PREFIX: &str = "CARELINE_SECRET";

/// The separator for configuration environment variables
pub const CONFIG_SEPARATOR: &str = "__";

/// The separator for secret environment variables
pub const SECRET_SEPARATOR: &str = "_";

/// Marker value in config files meaning "read this from the environment".
pub const SECRET_MARKER: &str = "secret_from_env";

/// Legacy variable names and the config path each one overrides.
pub const LEGACY_ENV_VARS: &[(&str, &str)] = &[
    ("GOOGLE_CALENDAR_API_KEY", "gcal.api_key"),
    ("CALENDAR_ID", "gcal.calendar_id"),
    ("JWT_SECRET_KEY", "auth.jwt_secret"),
    ("DATABASE_URI", "database.url"),
];

/// Get the prefix for configuration environment variables
pub fn get_config_prefix() -> String {
    env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string())
}

/// Convert a configuration path (`server.host`) to `CARELINE__SERVER__HOST`.
pub fn config_path_to_env_var(path: &str) -> String {
    let prefix = get_config_prefix();
    let path = path.replace('.', CONFIG_SEPARATOR);
    format!("{}{}{}", prefix, CONFIG_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path (`gcal.api_key`) to `CARELINE_SECRET_GCAL_API_KEY`.
pub fn secret_path_to_env_var(path: &str) -> String {
    let path = path.replace('.', SECRET_SEPARATOR);
    format!("{}{}{}", SECRET_PREFIX, SECRET_SEPARATOR, path).to_uppercase()
}

/// Convert a secret path (`gcal.api_key`) to the short form `GCAL_API_KEY`.
pub fn legacy_secret_path_to_env_var(path: &str) -> String {
    let parts: Vec<&str> = path.split('.').collect();
    if parts.len() < 2 {
        return path.to_uppercase();
    }

    let service = parts[0];
    let key = parts[1..].join(SECRET_SEPARATOR);
    format!("{}_{}", service, key).to_uppercase()
}

/// Paths containing "secret", "key", "password" or "token" are secrets.
pub fn is_secret_path(path: &str) -> bool {
    let path_lower = path.to_lowercase();
    path_lower.contains("secret")
        || path_lower.contains("key")
        || path_lower.contains("password")
        || path_lower.contains("token")
}

/// Resolve a path to its environment value using `lookup`.
pub fn get_env_var_with<F>(path: &str, lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    if is_secret_path(path) {
        lookup(&secret_path_to_env_var(path))
            .or_else(|| lookup(&legacy_secret_path_to_env_var(path)))
    } else {
        lookup(&config_path_to_env_var(path))
    }
}

/// Resolve a path against the process environment.
pub fn get_env_var(path: &str) -> Option<String> {
    get_env_var_with(path, &|name| env::var(name).ok())
}

/// Replace every `"secret_from_env"` string with its environment value.
///
/// Returns `true` if anything was replaced.
pub fn inject_env_vars_with<F>(value: &mut Value, lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    fn walk<F>(path: Vec<String>, obj: &mut Value, lookup: &F) -> bool
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut replaced = false;

        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    replaced |= walk(new_path, v, lookup);
                }
            }
            Value::Array(arr) => {
                for (i, v) in arr.iter_mut().enumerate() {
                    let mut new_path = path.clone();
                    new_path.push(i.to_string());
                    replaced |= walk(new_path, v, lookup);
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let path_str = path.join(".");
                if let Some(env_val) = get_env_var_with(&path_str, lookup) {
                    *s = env_val;
                    replaced = true;
                } else {
                    warn!("env var for {} not found", path_str);
                }
            }
            _ => {}
        }

        replaced
    }

    walk(vec![], value, lookup)
}

/// Apply [`LEGACY_ENV_VARS`] on top of an already loaded config value.
///
/// Missing intermediate sections are created. Returns the number of values set.
pub fn apply_legacy_env_vars_with<F>(value: &mut Value, lookup: &F) -> usize
where
    F: Fn(&str) -> Option<String>,
{
    let mut applied = 0;
    for (name, path) in LEGACY_ENV_VARS {
        if let Some(env_val) = lookup(name) {
            set_path(value, path, Value::String(env_val));
            applied += 1;
        }
    }
    applied
}

/// Set a dotted path inside a JSON object, creating objects along the way.
fn set_path(root: &mut Value, path: &str, new_value: Value) {
    let mut current = root;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Value::Object(map) = current else {
            return;
        };
        if parts.peek().is_none() {
            map.insert(part.to_string(), new_value);
            return;
        }
        current = map
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}
