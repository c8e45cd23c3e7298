//! Error types and handling for the `RecyClose` application

use thiserror::Error;

/// Main error type for the `RecyClose` application
#[derive(Error, Debug)]
pub enum RecycloseError {
    /// Configuration-related errors (missing map credential, bad settings)
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Map and geocoding service errors
    #[error("API error: {message}")]
    Api { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Bookmark storage errors
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl RecycloseError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new storage error
    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            RecycloseError::Config { message } => {
                format!("Map unavailable: {message}. Set MAPBOX_TOKEN or map.access_token in your config file.")
            }
            RecycloseError::Api { .. } => {
                "Unable to reach the map service. Please check your internet connection."
                    .to_string()
            }
            RecycloseError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            RecycloseError::Storage { .. } => {
                "Saved items could not be updated. Try clearing your saved list.".to_string()
            }
            RecycloseError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            RecycloseError::General { message } => message.clone(),
        }
    }
}

impl From<reqwest::Error> for RecycloseError {
    fn from(err: reqwest::Error) -> Self {
        RecycloseError::api(err.to_string())
    }
}

impl From<reqwest_middleware::Error> for RecycloseError {
    fn from(err: reqwest_middleware::Error) -> Self {
        RecycloseError::api(err.to_string())
    }
}

impl From<fjall::Error> for RecycloseError {
    fn from(err: fjall::Error) -> Self {
        RecycloseError::storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = RecycloseError::config("missing map token");
        assert!(matches!(config_err, RecycloseError::Config { .. }));

        let api_err = RecycloseError::api("geocode failed");
        assert!(matches!(api_err, RecycloseError::Api { .. }));

        let validation_err = RecycloseError::validation("empty tag vocabulary");
        assert!(matches!(validation_err, RecycloseError::Validation { .. }));

        let storage_err = RecycloseError::storage("keyspace closed");
        assert!(matches!(storage_err, RecycloseError::Storage { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = RecycloseError::config("missing token");
        assert!(config_err.user_message().contains("Map unavailable"));
        assert!(config_err.user_message().contains("MAPBOX_TOKEN"));

        let api_err = RecycloseError::api("test");
        assert!(api_err.user_message().contains("Unable to reach"));

        let validation_err = RecycloseError::validation("latitude 91");
        assert!(validation_err.user_message().contains("latitude 91"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: RecycloseError = io_err.into();
        assert!(matches!(err, RecycloseError::Io { .. }));
    }
}
