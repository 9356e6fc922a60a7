//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub log_level: Level,
    pub prompts_path: PathBuf,
    pub command_catalog_path: Option<PathBuf>,
    pub openai_api_key: String,
    pub openai_base_url: Option<String>,
    pub regeneration_model: String,
    pub correction_model: String,
    pub generation_model: String,
    pub cors_allowed_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        // --- Load Server Settings ---
        let bind_address_str = var_or("BIND_ADDRESS", "0.0.0.0:8000");
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_allowed_origin = var_or("CORS_ALLOWED_ORIGIN", "http://localhost:3000");

        // --- Load Prompt and Catalog Locations ---
        let prompts_path = PathBuf::from(var_or("PROMPTS_PATH", "./prompts"));
        let command_catalog_path = lookup("COMMAND_CATALOG_PATH").map(PathBuf::from);

        // --- Load LLM Settings ---
        let openai_api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingVar("OPENAI_API_KEY".to_string()))?;
        let openai_base_url = lookup("OPENAI_BASE_URL");
        let regeneration_model = var_or("REGENERATION_MODEL", "gpt-4o-mini");
        let correction_model = var_or("CORRECTION_MODEL", "gpt-4o-mini");
        let generation_model = var_or("GENERATION_MODEL", "gpt-4o-mini");

        Ok(Self {
            bind_address,
            log_level,
            prompts_path,
            command_catalog_path,
            openai_api_key,
            openai_base_url,
            regeneration_model,
            correction_model,
            generation_model,
            cors_allowed_origin,
        })
    }
}
