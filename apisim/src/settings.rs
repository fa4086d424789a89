//! Configuration management with environment variable support and validation.

use anyhow::{anyhow, Result};
use config::{Config, Environment};
use serde::{Deserialize, Serialize};
use url::Url;

/// Simulated API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Fixed base prefix; calls whose stringified target starts with this are
    /// intercepted.
    pub base_url: String,
    /// Literal prefix stripped from the URL path before route matching.
    pub path_prefix: String,
    /// Static bearer credential expected in the `Authorization` header.
    pub api_key: String,
    /// Simulated network latency applied to intercepted calls.
    pub latency_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.websim.dev/v1/".to_string(),
            path_prefix: "/v1".to_string(),
            api_key: "websim_dev_key".to_string(),
            latency_ms: 300,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "text"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
        }
    }
}

/// Main settings structure with all configuration sections.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiConfig,
    pub logging: LoggingConfig,
}

impl Settings {
    /// Load settings from the compiled-in defaults, an optional local
    /// `apisim.toml`, and environment variables with the `APISIM` prefix
    /// (e.g. `APISIM_API__LATENCY_MS=0`).
    pub fn load() -> Result<Self> {
        let config = Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name("apisim").required(false))
            .add_source(
                Environment::with_prefix("APISIM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings for consistency.
    pub fn validate(&self) -> Result<()> {
        let base = Url::parse(&self.api.base_url)
            .map_err(|e| anyhow!("Invalid api.base_url '{}': {}", self.api.base_url, e))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(anyhow!(
                "api.base_url must use http or https, got '{}'",
                base.scheme()
            ));
        }
        if !self
            .api
            .base_url
            .ends_with(&format!("{}/", self.api.path_prefix))
        {
            return Err(anyhow!(
                "api.base_url must end with '{}/' so stripped paths line up",
                self.api.path_prefix
            ));
        }
        if self.api.api_key.is_empty() {
            return Err(anyhow!("api.api_key cannot be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.api.latency_ms, 300);
        assert_eq!(settings.api.path_prefix, "/v1");
    }

    #[test]
    fn compiled_in_defaults_match_struct_defaults() {
        let config = Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap();
        let from_file: Settings = config.try_deserialize().unwrap();
        assert_eq!(from_file.api.base_url, Settings::default().api.base_url);
        assert_eq!(from_file.api.api_key, Settings::default().api.api_key);
    }

    #[test]
    fn rejects_inconsistent_configuration() {
        let mut settings = Settings::default();
        settings.api.base_url = "not a url".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.api.base_url = "https://api.websim.dev/v2/".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::default();
        settings.api.api_key = String::new();
        assert!(settings.validate().is_err());
    }
}
