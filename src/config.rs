//! Configuration management for the `RecyClose` application
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::RecycloseError;
use crate::dropoff::RadiusOption;
use crate::models::GeoPoint;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Environment variable consulted when `map.access_token` is unset
pub const MAP_TOKEN_ENV: &str = "MAPBOX_TOKEN";

/// Root configuration structure for the `RecyClose` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecycloseConfig {
    /// Map and geocoding provider configuration
    #[serde(default)]
    pub map: MapConfig,
    /// Drop-off locator settings
    #[serde(default)]
    pub dropoff: DropoffConfig,
    /// Saved-items storage
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,
}

/// Map provider configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Provider access token; without it the map is unavailable
    pub access_token: Option<String>,
    /// Map style URL handed to the renderer
    #[serde(default = "default_style_url")]
    pub style_url: String,
    /// Base URL for geocoding requests
    #[serde(default = "default_geocoding_base_url")]
    pub geocoding_base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_map_timeout")]
    pub timeout_seconds: u32,
    /// Retries for transient geocoding failures
    #[serde(default = "default_map_max_retries")]
    pub max_retries: u32,
}

/// Drop-off locator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DropoffConfig {
    /// Number of points in the directory
    #[serde(default = "default_point_count")]
    pub point_count: usize,
    /// Longitude of the default search center
    #[serde(default = "default_center_longitude")]
    pub center_longitude: f64,
    /// Latitude of the default search center
    #[serde(default = "default_center_latitude")]
    pub center_latitude: f64,
    /// Label shown for the default center
    #[serde(default = "default_center_label")]
    pub center_label: String,
    /// Radius applied when the client does not pick one
    #[serde(default)]
    pub default_radius: RadiusOption,
}

/// Saved-items storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory of the saved-items keyspace; `None` keeps them in memory
    #[serde(default = "default_storage_location")]
    pub location: Option<String>,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory of the built frontend
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

// Default value functions
fn default_style_url() -> String {
    "mapbox://styles/mapbox/streets-v12".to_string()
}

fn default_geocoding_base_url() -> String {
    "https://api.mapbox.com".to_string()
}

fn default_map_timeout() -> u32 {
    8
}

fn default_map_max_retries() -> u32 {
    2
}

fn default_point_count() -> usize {
    60
}

fn default_center_longitude() -> f64 {
    -122.3321
}

fn default_center_latitude() -> f64 {
    47.6062
}

fn default_center_label() -> String {
    "Seattle, WA".to_string()
}

fn default_storage_location() -> Option<String> {
    dirs::data_dir().map(|dir| dir.join("recyclose").join("saved").to_string_lossy().into_owned())
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_static_dir() -> String {
    "frontend/dist".to_string()
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            style_url: default_style_url(),
            geocoding_base_url: default_geocoding_base_url(),
            timeout_seconds: default_map_timeout(),
            max_retries: default_map_max_retries(),
        }
    }
}

impl Default for DropoffConfig {
    fn default() -> Self {
        Self {
            point_count: default_point_count(),
            center_longitude: default_center_longitude(),
            center_latitude: default_center_latitude(),
            center_label: default_center_label(),
            default_radius: RadiusOption::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            location: default_storage_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            static_dir: default_static_dir(),
        }
    }
}

impl Default for RecycloseConfig {
    fn default() -> Self {
        Self {
            map: MapConfig::default(),
            dropoff: DropoffConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl RecycloseConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // RECYCLOSE__MAP__ACCESS_TOKEN, RECYCLOSE__SERVER__PORT, ...
        builder = builder.add_source(
            Environment::with_prefix("RECYCLOSE")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: RecycloseConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        if config.map.access_token.is_none() {
            config.map.access_token = std::env::var(MAP_TOKEN_ENV).ok();
        }

        config.apply_defaults();
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("recyclose").join("config.toml"))
    }

    /// Apply default values to empty configuration fields
    pub fn apply_defaults(&mut self) {
        if self.map.style_url.is_empty() {
            self.map.style_url = default_style_url();
        }
        if self.map.geocoding_base_url.is_empty() {
            self.map.geocoding_base_url = default_geocoding_base_url();
        }
        if self.map.timeout_seconds == 0 {
            self.map.timeout_seconds = default_map_timeout();
        }
        if self
            .map
            .access_token
            .as_deref()
            .is_some_and(|t| t.trim().is_empty())
        {
            self.map.access_token = None;
        }
        if self.dropoff.center_label.is_empty() {
            self.dropoff.center_label = default_center_label();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.server.static_dir.is_empty() {
            self.server.static_dir = default_static_dir();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_numeric_ranges()?;
        self.validate_center()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Default search center as a point
    pub fn default_center(&self) -> crate::Result<GeoPoint> {
        GeoPoint::new(self.dropoff.center_longitude, self.dropoff.center_latitude)
    }

    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.map.timeout_seconds > 120 {
            return Err(RecycloseError::config("Map request timeout cannot exceed 120 seconds").into());
        }

        if self.map.max_retries > 10 {
            return Err(RecycloseError::config("Map max retries cannot exceed 10").into());
        }

        if self.dropoff.point_count > 10_000 {
            return Err(RecycloseError::config("Drop-off point count cannot exceed 10000").into());
        }

        Ok(())
    }

    fn validate_center(&self) -> Result<()> {
        self.default_center()
            .map_err(|e| RecycloseError::config(format!("Invalid default center: {e}")))?;
        Ok(())
    }

    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(RecycloseError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(RecycloseError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        let base_url = &self.map.geocoding_base_url;
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(RecycloseError::config(
                "Geocoding base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }
}
