pub mod app;
pub mod config;
pub mod error;
pub mod random;

pub use app::App;
pub use config::{AiConfig, Config, ImportConfig, StorageConfig, StorageKind, WeatherConfig};
pub use error::{AppError, ConfigError, DatabaseError, EnhancementError, ImportError, NetworkError};
pub use random::{RandomSource, SeededRandom, SequenceRandom, ThreadRandom};

use anyhow::Result;

/// Initialize logging for the application.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install tracing subscriber: {}", e))?;

    tracing::info!("Asir Explorer core initialized");
    Ok(())
}
