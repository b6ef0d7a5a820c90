//! Centralized error types for Asir Explorer.
//!
//! This module provides a typed error hierarchy that:
//! - Enables precise error handling throughout the data layer
//! - Provides user-friendly messages suitable for UI display
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// Top-level application error type.
///
/// Service crates convert their own errors into this type at the boundary.
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Storage error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    #[error("Enhancement error: {0}")]
    Enhancement(#[from] EnhancementError),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the UI.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Network(e) => e.user_message(),
            AppError::Database(e) => e.user_message(),
            AppError::Config(e) => e.user_message(),
            AppError::Import(e) => e.user_message(),
            AppError::Enhancement(e) => e.user_message(),
            AppError::Other(_) => "An unexpected error occurred. Please try again.",
        }
    }

    /// Only import failures block the admin with an alert; everything else
    /// degrades and keeps the workflow usable.
    pub fn is_blocking(&self) -> bool {
        matches!(self, AppError::Import(ImportError::Failed(_)))
    }
}

/// Network-related errors (HTTP, connectivity).
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl NetworkError {
    pub fn user_message(&self) -> &'static str {
        match self {
            NetworkError::ConnectionFailed(_) => {
                "Unable to connect. Check your internet connection."
            }
            NetworkError::Timeout => "The request timed out. Please try again.",
            NetworkError::ServerError { status, .. } if *status >= 500 => {
                "The server is experiencing issues. Please try again later."
            }
            NetworkError::ServerError { .. } => "The request failed. Please try again.",
            NetworkError::InvalidResponse(_) => {
                "Received an unexpected response. Please try again."
            }
        }
    }
}

/// Persistent store errors.
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Storage unavailable: {0}")]
    ConnectionFailed(String),

    #[error("Storage operation failed: {0}")]
    QueryFailed(String),

    #[error("Stored data is corrupt: {0}")]
    Corruption(String),
}

impl DatabaseError {
    pub fn user_message(&self) -> &'static str {
        match self {
            DatabaseError::ConnectionFailed(_) => {
                "Unable to access local data. Try restarting the app."
            }
            DatabaseError::QueryFailed(_) => "A data operation failed. Please try again.",
            DatabaseError::Corruption(_) => {
                "Saved data was unreadable and has been reset to the defaults."
            }
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Configuration parse error: {0}")]
    ParseError(String),

    #[error("Missing required setting: {0}")]
    MissingSetting(String),
}

impl ConfigError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ConfigError::Invalid(_) => "Invalid configuration. Check your settings.",
            ConfigError::ParseError(_) => "Configuration file is malformed. Check your settings.",
            ConfigError::MissingSetting(_) => "A required setting is missing. Check your settings.",
        }
    }
}

/// Mock maps import errors.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Import failed: {0}")]
    Failed(String),

    #[error("An import is already in progress")]
    InProgress,
}

impl ImportError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ImportError::Failed(_) => "Failed to import data",
            ImportError::InProgress => "An import is already running. Please wait.",
        }
    }
}

/// AI description enhancement errors.
///
/// These never escape the enhancer as failures; they are reported alongside
/// the unchanged places so the admin can be told the polish did not apply.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EnhancementError {
    #[error("No API credential configured")]
    MissingCredential,

    #[error("Service request failed: {0}")]
    Request(String),

    #[error("Unexpected response: {0}")]
    InvalidResponse(String),

    #[error("Expected {expected} descriptions, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },
}

impl EnhancementError {
    pub fn user_message(&self) -> &'static str {
        match self {
            EnhancementError::MissingCredential => {
                "AI polish is unavailable: no API key configured."
            }
            EnhancementError::Request(_)
            | EnhancementError::InvalidResponse(_)
            | EnhancementError::LengthMismatch { .. } => {
                "AI Enhancement failed. Original descriptions were kept."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}

/// Extension trait for converting rusqlite errors to our error types.
pub trait RusqliteErrorExt {
    fn into_database_error(self) -> DatabaseError;
}

impl RusqliteErrorExt for rusqlite::Error {
    fn into_database_error(self) -> DatabaseError {
        match &self {
            rusqlite::Error::SqliteFailure(_, Some(msg)) if msg.contains("corrupt") => {
                DatabaseError::Corruption(self.to_string())
            }
            rusqlite::Error::SqliteFailure(err, _)
                if err.code == rusqlite::ErrorCode::CannotOpen =>
            {
                DatabaseError::ConnectionFailed(self.to_string())
            }
            _ => DatabaseError::QueryFailed(self.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_are_non_empty() {
        let messages = [
            NetworkError::Timeout.user_message(),
            DatabaseError::Corruption("bad json".into()).user_message(),
            ConfigError::Invalid("test".into()).user_message(),
            ImportError::Failed("boom".into()).user_message(),
            EnhancementError::MissingCredential.user_message(),
        ];

        for message in messages {
            assert!(!message.is_empty());
        }
    }

    #[test]
    fn test_app_error_conversion() {
        let app_err: AppError = ImportError::InProgress.into();
        assert!(matches!(app_err, AppError::Import(ImportError::InProgress)));
    }

    #[test]
    fn test_only_import_failure_blocks() {
        assert!(AppError::from(ImportError::Failed("x".into())).is_blocking());
        assert!(!AppError::from(ImportError::InProgress).is_blocking());
        assert!(!AppError::from(EnhancementError::MissingCredential).is_blocking());
        assert!(!AppError::from(DatabaseError::Corruption("x".into())).is_blocking());
    }

    #[test]
    fn test_import_failure_message_matches_alert() {
        let app_err = AppError::Import(ImportError::Failed("timeout".into()));
        assert_eq!(app_err.user_message(), "Failed to import data");
    }

    #[test]
    fn test_length_mismatch_display() {
        let err = EnhancementError::LengthMismatch {
            expected: 3,
            actual: 2,
        };
        assert_eq!(err.to_string(), "Expected 3 descriptions, got 2");
    }

    #[test]
    fn test_sqlite_error_classification() {
        let err = rusqlite::Error::QueryReturnedNoRows.into_database_error();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
