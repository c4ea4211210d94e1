//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Process configuration, read from `ONBOARDING_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// HTTP port for the REST API.
    pub port: u16,
    /// libSQL database file.
    pub db_path: PathBuf,
    /// Owner created on startup when the store has none.
    pub owner_name: String,
    pub owner_email: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            db_path: PathBuf::from("./data/onboarding.db"),
            owner_name: "Demo Owner".to_string(),
            owner_email: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys take the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let port = match get("ONBOARDING_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: "ONBOARDING_PORT".to_string(),
                message: format!("{raw:?}: {e}"),
            })?,
            None => defaults.port,
        };

        Ok(Self {
            port,
            db_path: get("ONBOARDING_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.db_path),
            owner_name: get("ONBOARDING_OWNER_NAME").unwrap_or(defaults.owner_name),
            owner_email: get("ONBOARDING_OWNER_EMAIL"),
        })
    }
}
