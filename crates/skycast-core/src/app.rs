use anyhow::Result;
use std::sync::Arc;

use crate::config::{Config, ValidationResult};

/// Application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
}

impl App {
    /// Create a new application instance from the on-disk configuration.
    ///
    /// Fails when the configuration has validation errors.
    pub fn new() -> Result<Self> {
        let app = Self::with_config(Config::load()?);
        let validation = app.check();
        if !validation.is_valid() {
            anyhow::bail!(
                "Configuration validation failed: {}",
                validation.error_summary()
            );
        }
        Ok(app)
    }

    /// Create an application around an already loaded configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Validate the held configuration, logging warnings
    pub fn check(&self) -> ValidationResult {
        let result = self.config.validate();
        for warning in &result.warnings {
            tracing::warn!("Config warning: {}", warning);
        }
        for error in &result.errors {
            tracing::error!("Config error: {}", error);
        }
        result
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

    /// Shared handle to the application config
    pub fn shared_config(&self) -> Arc<Config> {
        self.config.clone()
    }
}
