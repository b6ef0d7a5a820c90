use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variables checked, in order, for the AI service credential.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

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

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the persisted directory blob
    pub data_dir: PathBuf,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub import: ImportConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub ai: AiConfig,
}

/// Which storage backend holds the governorate blob
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Process-local, lost on exit
    Memory,
    /// One JSON file per key under `data_dir`
    #[default]
    File,
    /// Single-table SQLite database under `data_dir`
    Sqlite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageKind,

    /// Namespaced key the whole governorate list is stored under
    #[serde(default = "default_storage_key")]
    pub key: String,
}

fn default_storage_key() -> String {
    "asir_explorer_db_v3".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageKind::default(),
            key: default_storage_key(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Simulated maps API latency
    #[serde(default = "default_import_latency")]
    pub latency_ms: u64,

    /// Places returned per import
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_import_latency() -> u64 {
    1200
}

fn default_batch_size() -> usize {
    3
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_import_latency(),
            batch_size: default_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Simulated weather API latency
    #[serde(default = "default_weather_latency")]
    pub latency_ms: u64,
}

fn default_weather_latency() -> u64 {
    500
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_weather_latency(),
        }
    }
}

/// Generative text service settings.
///
/// The API key is read from the environment and never written to the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AiConfig {
    #[serde(skip)]
    pub api_key: Option<String>,

    #[serde(default = "default_ai_model")]
    pub model: String,

    #[serde(default = "default_ai_base_url")]
    pub base_url: String,

    #[serde(default = "default_ai_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_ai_max_retries")]
    pub max_retries: u32,
}

fn default_ai_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_ai_timeout() -> u64 {
    30
}

fn default_ai_max_retries() -> u32 {
    2
}

impl AiConfig {
    /// Check if a usable credential is present
    pub fn is_configured(&self) -> bool {
        self.api_key
            .as_deref()
            .is_some_and(|key| !key.trim().is_empty())
    }

    /// Read the credential from the first non-empty known environment variable
    pub fn api_key_from_env() -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_ai_model(),
            base_url: default_ai_base_url(),
            timeout_seconds: default_ai_timeout(),
            max_retries: default_ai_max_retries(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("asir-explorer");

        Self {
            data_dir,
            storage: StorageConfig::default(),
            import: ImportConfig::default(),
            weather: WeatherConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist.
    ///
    /// The AI credential is filled in from the environment.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.ai.api_key = AiConfig::api_key_from_env();
        Ok(config)
    }

    /// Load configuration from an explicit path, writing defaults if missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents =
            std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

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

        if self.storage.key.trim().is_empty() {
            result.add_error("storage.key", "Storage key cannot be empty");
        }

        if self.import.batch_size == 0 {
            result.add_error("import.batch_size", "Batch size must be greater than 0");
        } else if self.import.batch_size > 20 {
            result.add_warning("import.batch_size", "Batch size is unusually large (>20)");
        }

        if self.import.latency_ms > 60_000 {
            result.add_warning("import.latency_ms", "Import latency is more than a minute");
        }

        if self.weather.latency_ms > 60_000 {
            result.add_warning("weather.latency_ms", "Weather latency is more than a minute");
        }

        self.validate_url(&self.ai.base_url, "ai.base_url", &mut result);

        if self.ai.model.trim().is_empty() {
            result.add_error("ai.model", "Model name cannot be empty");
        }

        if self.ai.timeout_seconds == 0 {
            result.add_error("ai.timeout_seconds", "Timeout must be greater than 0");
        } else if self.ai.timeout_seconds > 300 {
            result.add_error("ai.timeout_seconds", "Timeout cannot exceed 300 seconds");
        }

        if self.ai.max_retries > 10 {
            result.add_error("ai.max_retries", "Max retries cannot exceed 10");
        }

        if !self.ai.is_configured() {
            result.add_warning(
                "ai.api_key",
                "No API key set (GEMINI_API_KEY or API_KEY) - AI polish will return places unchanged",
            );
        }

        result
    }

    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let contents =
            toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| ConfigError::MissingSetting("user config directory".to_string()))?
            .join("asir-explorer");

        Ok(config_dir.join("config.toml"))
    }
}
