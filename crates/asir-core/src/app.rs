use anyhow::{Context, Result};

use crate::Config;

/// Main application state and lifecycle manager
pub struct App {
    config: Config,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    pub fn new() -> Result<Self> {
        let (config, _warnings) = Config::load_validated()?;
        Ok(Self::with_config(config))
    }

    /// Create an application instance from an already-built configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
        }
    }

    /// Prepare the data directory
    pub fn initialize(&self) -> Result<()> {
        tracing::info!(
            "Initializing application (storage backend: {:?}, data dir: {})",
            self.config.storage.backend,
            self.config.data_dir.display()
        );

        std::fs::create_dir_all(&self.config.data_dir).with_context(|| {
            format!(
                "Failed to create data directory: {}",
                self.config.data_dir.display()
            )
        })?;

        tracing::info!("Application initialized successfully");
        Ok(())
    }

    pub fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down application");
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }
}
