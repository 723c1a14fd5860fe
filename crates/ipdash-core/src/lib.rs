pub mod app;
pub mod config;
pub mod error;
pub mod lang;

pub use app::App;
pub use config::{Config, GeneralConfig, ProvidersConfig, TransportContext, ValidationResult};
pub use error::{AppError, ConfigError, NetworkError, ReqwestErrorExt, WeatherError};
pub use lang::{Language, UnsupportedLanguage};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::info!("ipdash core initialized");
    Ok(())
}
