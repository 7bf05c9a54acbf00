//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` (or the path in `FORECAST_CONFIG`) and deserializes
//! into strongly-typed structs. Every field has a default, so a missing
//! file is not an error. The Weatherbit key is referenced by env-var name
//! and resolved at runtime via `std::env::var`.

use anyhow::{bail, Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::provider::weatherbit::DEFAULT_BASE_URL;

/// Env var that overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "FORECAST_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Weatherbit serves at most 16 days of daily forecast.
const MAX_FORECAST_DAYS: u32 = 16;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ProviderConfig {
    pub base_url: String,
    /// Name of the env var holding the Weatherbit API key.
    pub api_key_env: String,
    pub forecast_days: u32,
    pub timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key_env: "WEATHERBIT_API_KEY".into(),
            forecast_days: 10,
            timeout_secs: 10,
            connect_timeout_secs: 5,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Like [`AppConfig::load`], but falls back to defaults when the file
    /// does not exist.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let provider = &self.provider;
        if !(1..=MAX_FORECAST_DAYS).contains(&provider.forecast_days) {
            bail!(
                "provider.forecast_days must be between 1 and {MAX_FORECAST_DAYS}, got {}",
                provider.forecast_days
            );
        }
        if provider.timeout_secs == 0 || provider.connect_timeout_secs == 0 {
            bail!("provider timeouts must be greater than zero");
        }
        if !provider.base_url.starts_with("http://") && !provider.base_url.starts_with("https://") {
            bail!("provider.base_url must be an http(s) URL");
        }
        if provider.api_key_env.trim().is_empty() {
            bail!("provider.api_key_env must name an environment variable");
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }

    /// The Weatherbit key, if set and non-blank. An absent key is not a
    /// start-up error; requests are answered with 401 instead.
    pub fn api_key(&self) -> Option<SecretString> {
        Self::resolve_env(&self.provider.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::new)
    }
}
