//! Configuration management for the cold-storage consolidation server
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides as `COLDSTORE__SECTION__KEY`
//!    (for example `COLDSTORE__API__BASE_URL`)

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use shared::TareCode;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Remote persistence API
    pub api: ApiConfig,

    /// Reception entry behaviour
    pub intake: IntakeConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the inventory persistence API
    pub base_url: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IntakeConfig {
    /// Reject price writes that raced with another edit instead of
    /// letting the last write win
    pub strict_price_sync: bool,

    /// Tare applied to new reception lines
    pub default_tare_code: TareCode,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("COLDSTORE_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 3000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("api.base_url", "http://localhost:8080/api")?
            .set_default("api.timeout_secs", 30)?
            .set_default("intake.strict_price_sync", false)?
            .set_default("intake.default_tare_code", "3")?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables, e.g. COLDSTORE__SERVER__PORT
            .add_source(
                Environment::with_prefix("COLDSTORE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            strict_price_sync: false,
            default_tare_code: TareCode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_overrides_use_double_underscore_sections() {
        std::env::set_var("COLDSTORE__API__BASE_URL", "http://inventory.internal/api");
        std::env::set_var("COLDSTORE__INTAKE__STRICT_PRICE_SYNC", "true");
        std::env::set_var("COLDSTORE__SERVER__PORT", "8181");

        let config = Config::load();

        std::env::remove_var("COLDSTORE__API__BASE_URL");
        std::env::remove_var("COLDSTORE__INTAKE__STRICT_PRICE_SYNC");
        std::env::remove_var("COLDSTORE__SERVER__PORT");

        let config = config.unwrap();
        assert_eq!(config.api.base_url, "http://inventory.internal/api");
        assert!(config.intake.strict_price_sync);
        assert_eq!(config.server.port, 8181);
        assert_eq!(config.intake.default_tare_code, TareCode::Three);
    }
}
