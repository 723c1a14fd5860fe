use anyhow::Result;

use crate::config::ValidationResult;
use crate::Config;

/// Application configuration and lifecycle manager
pub struct App {
    config: Config,
    validation: ValidationResult,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    pub fn new() -> Result<Self> {
        let (config, validation) = Config::load_validated()?;
        Ok(Self::with_config(config, validation))
    }

    /// Create an application instance around an already-loaded configuration
    pub fn with_config(config: Config, validation: ValidationResult) -> Self {
        Self {
            config,
            validation,
        }
    }

    /// Log the effective settings
    pub fn initialize(&mut self) -> Result<()> {
        tracing::info!(
            language = %self.config.general.default_language,
            transport = ?self.config.general.transport,
            warnings = self.validation.warnings.len(),
            "Initializing application"
        );
        tracing::debug!(
            primary = %self.config.providers.primary_url,
            fallback = %self.config.providers.fallback_url,
            weather = %self.config.providers.weather_url,
            "Provider endpoints"
        );
        Ok(())
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Warnings produced when the config was validated
    pub fn warnings(&self) -> &[crate::config::ConfigValidationError] {
        &self.validation.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_config_exposes_settings() {
        let mut config = Config::default();
        config.providers.request_timeout_secs = Some(3);
        let validation = config.validate();
        let mut app = App::with_config(config, validation);

        app.initialize().unwrap();
        assert_eq!(app.config().providers.request_timeout_secs, Some(3));
        assert!(app.warnings().is_empty());
        app.shutdown().unwrap();
    }
}
