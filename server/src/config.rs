//! Server configuration read from the environment.
//!
//! DESIGN
//! ======
//! Every knob has a default except `DATABASE_URL`. Numeric values that fail
//! to parse fall back to their default with a warning rather than aborting
//! startup. Lookup goes through a closure so tests never touch the process
//! environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;

use tracing::warn;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_SESSION_TTL_HOURS: i32 = 168;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Lifetime of a session, both in the database and as cookie max-age.
    pub session_ttl_hours: i32,
    pub cookie_secure: bool,
}

impl Config {
    /// Read configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `Missing` when `DATABASE_URL` is unset or blank.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns `Missing` when `DATABASE_URL` is unset or blank.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("DATABASE_URL"))?;

        Ok(Self {
            database_url,
            port: env_parse(&lookup, "PORT").unwrap_or(DEFAULT_PORT),
            db_max_connections: env_parse(&lookup, "DB_MAX_CONNECTIONS").unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
            session_ttl_hours: env_parse(&lookup, "SESSION_TTL_HOURS")
                .filter(|h| *h > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
            cookie_secure: env_bool(&lookup, "COOKIE_SECURE").unwrap_or(false),
        })
    }
}

/// Parse `key` as `T`. Unset yields `None`; unparseable yields `None` and a warning.
pub(crate) fn env_parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparseable setting");
            None
        }
    }
}

/// Accepts `1/true/yes/on` and `0/false/no/off`, case-insensitively.
pub(crate) fn env_bool(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    lookup(key).and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}
