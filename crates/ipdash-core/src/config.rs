use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;
use crate::Language;

/// Environment variable prefix for overrides, e.g. `IPDASH_GENERAL__DEFAULT_LANGUAGE=de`
pub const ENV_PREFIX: &str = "IPDASH";

const DEFAULT_PRIMARY_URL: &str = "http://ip-api.com/json/";
const DEFAULT_FALLBACK_URL: &str = "https://ipwho.is/";
const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";
const DEFAULT_USER_AGENT: &str = concat!("ipdash/", env!("CARGO_PKG_VERSION"));

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Transport the dashboard itself is served over.
///
/// Under `Secure`, plain-http providers are off limits (mixed content) and
/// the primary geolocation lookup is skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportContext {
    #[default]
    Plain,
    Secure,
}

impl TransportContext {
    pub fn is_secure(self) -> bool {
        matches!(self, TransportContext::Secure)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    #[serde(skip, default = "default_config_dir")]
    pub config_dir: PathBuf,

    /// Language and transport settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Remote provider endpoints
    #[serde(default)]
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Language used for the startup lookup
    #[serde(default)]
    pub default_language: Language,

    /// Transport context the dashboard runs under
    #[serde(default)]
    pub transport: TransportContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Primary IP geolocation endpoint (ip-api.com schema, plain http on the free tier)
    #[serde(default = "default_primary_url")]
    pub primary_url: String,

    /// Fallback IP geolocation endpoint (ipwho.is schema)
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,

    /// Weather forecast endpoint (Open-Meteo schema)
    #[serde(default = "default_weather_url")]
    pub weather_url: String,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional per-request timeout. Unset means no client-side limit.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ipdash")
}

fn default_primary_url() -> String {
    DEFAULT_PRIMARY_URL.to_string()
}

fn default_fallback_url() -> String {
    DEFAULT_FALLBACK_URL.to_string()
}

fn default_weather_url() -> String {
    DEFAULT_WEATHER_URL.to_string()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            fallback_url: default_fallback_url(),
            weather_url: default_weather_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_dir: default_config_dir(),
            general: GeneralConfig::default(),
            providers: ProvidersConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file, creating default if it doesn't exist.
    /// `IPDASH_*` environment variables override file values.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::default().save_to(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from an explicit file, layering environment overrides on top
    pub fn load_from(path: &Path) -> Result<Self> {
        let layered = config::Config::builder()
            .add_source(config::File::from(path.to_path_buf()).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .context("Failed to read config file")?;

        let mut config: Config = layered
            .try_deserialize()
            .context("Failed to parse config file")?;

        if let Some(parent) = path.parent() {
            config.config_dir = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Returns the config along with any validation warnings.
    /// Returns an error if validation fails with critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();
        let secure = self.general.transport.is_secure();

        if let Some(url) = self.validate_url(&self.providers.primary_url, "providers.primary_url", &mut result) {
            if secure && url.scheme() == "http" {
                result.add_warning(
                    "providers.primary_url",
                    "Plain http provider will be skipped under a secure transport context",
                );
            }
        }

        for (value, field) in [
            (&self.providers.fallback_url, "providers.fallback_url"),
            (&self.providers.weather_url, "providers.weather_url"),
        ] {
            if let Some(url) = self.validate_url(value, field, &mut result) {
                if secure && url.scheme() == "http" {
                    result.add_warning(
                        field,
                        "Plain http endpoint may be blocked as mixed content",
                    );
                }
            }
        }

        if self.providers.user_agent.trim().is_empty() {
            result.add_warning("providers.user_agent", "Empty User-Agent; some providers reject it");
        }

        if self.providers.request_timeout_secs == Some(0) {
            result.add_error(
                "providers.request_timeout_secs",
                "Timeout must be greater than 0 (omit it to disable)",
            );
        }

        result
    }

    /// Validate a URL field, returning the parsed URL when it is usable
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) -> Option<Url> {
        let url = match Url::parse(url_str) {
            Ok(url) => url,
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
                return None;
            }
        };

        if url.scheme() != "http" && url.scheme() != "https" {
            result.add_error(
                field_name,
                format!("URL must use http or https scheme, got: {}", url.scheme()),
            );
            return None;
        }

        if url.host().is_none() {
            result.add_error(field_name, "URL must have a host");
            return None;
        }

        if url.port() == Some(0) {
            result.add_error(field_name, "Port cannot be 0");
            return None;
        }

        Some(url)
    }

    /// Save configuration to an explicit file
    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(config_path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("ipdash");

        Ok(config_dir.join("config.toml"))
    }
}
