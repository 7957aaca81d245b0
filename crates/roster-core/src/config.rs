use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{CONFIG_FILE, ENV_PREFIX, ENV_SEPARATOR};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub authorization: AuthorizationConfig,
    pub logging: LoggingConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// HTTP status used for every denied detail or list request.
///
/// Applied globally so list and detail endpoints never disagree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialStatus {
    /// Answer `404 Not Found`, hiding whether the file exists.
    #[default]
    NotFound,
    /// Answer `403 Forbidden`.
    Forbidden,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthorizationConfig {
    /// CSV policy file for role tiers. The embedded default policy is used when unset.
    pub policy_path: Option<String>,
    #[serde(default)]
    pub denial_status: DenialStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u8,
}

/// JSON catalog of files and members, for running without a database.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Settings {
    /// ## Summary
    /// Loads configuration from environment variables and an optional `config.toml`.
    /// Environment variables take precedence over file values.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Ok(Self::builder()?.build()?.try_deserialize::<Settings>()?)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(Config::builder()
            .set_default("logging.level", "info")?
            .set_default("authorization.denial_status", "not_found")?
            .set_default("database.max_connections", 4)?
            // TOML file
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            // Env
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .ignore_empty(true)
                    .try_parsing(true),
            ))
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
