//! Configuration file handling for ~/.boundaries-explorer/config.ini.
//!
//! Loads and saves user configuration with sensible defaults.
//! Settings structs live in [`super::settings`], constants in [`super::defaults`],
//! parsing in [`super::parser`], and serialization in [`super::writer`].

use ini::Ini;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub use super::defaults::*;
pub use super::settings::*;

use super::controller::ControllerConfig;
use crate::backend::BackendEndpoints;
use crate::layers::OverlayStyle;
use crate::model::SearchRadius;

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Failed to write config file
    #[error("Failed to write config file: {0}")]
    WriteError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },

    /// Failed to create config directory
    #[error("Failed to create config directory: {0}")]
    DirectoryError(std::io::Error),
}

impl ConfigFile {
    /// Load configuration from the default path, then apply environment
    /// overrides.
    pub fn load() -> Result<Self, ConfigFileError> {
        let path = config_file_path();
        Ok(Self::load_from(&path)?.with_env_overrides())
    }

    /// Load configuration from a specific path.
    ///
    /// If the file doesn't exist, returns defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path)?;
        super::parser::parse_ini(&ini)
    }

    /// Applies `BOUNDARIES_EXPLORER_BASE_URL`, if set.
    pub fn with_env_overrides(mut self) -> Self {
        self.apply_base_url_override(std::env::var(BASE_URL_ENV).ok());
        self
    }

    fn apply_base_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.map(|v| v.trim().to_string()) {
            if !url.is_empty() {
                self.backend.base_url = url;
            }
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        let path = config_file_path();
        self.save_to(&path)
    }

    /// Save configuration to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigFileError::DirectoryError)?;
        }

        std::fs::write(path, self.to_ini_string())
            .map_err(|e| ConfigFileError::WriteError(e.to_string()))
    }

    /// The INI text [`save_to`](Self::save_to) would write.
    pub fn to_ini_string(&self) -> String {
        super::writer::to_config_string(self)
    }

    /// Create the default config file if it doesn't exist.
    ///
    /// Returns the path to the config file.
    pub fn ensure_exists() -> Result<PathBuf, ConfigFileError> {
        let path = config_file_path();
        if !path.exists() {
            Self::default().save_to(&path)?;
        }
        Ok(path)
    }

    /// Controller tuning described by this file.
    pub fn controller_config(&self) -> ControllerConfig {
        let defaults = ControllerConfig::default();
        let mut boundary_style = defaults.boundary_style().clone();
        boundary_style.fill_color = self.map.default_fill_color.clone();
        boundary_style.highlight_color = self.map.highlight_color.clone();

        defaults
            .with_search_radius(SearchRadius::from_meters(self.nearby.radius_m).unwrap_or_default())
            .with_highlight_delay(Duration::from_millis(self.map.highlight_delay_ms))
            .with_circle_points(self.map.circle_points)
            .with_boundary_style(boundary_style)
            .with_overlay_style(OverlayStyle::new(
                self.nearby.palette.clone(),
                DEFAULT_OVERLAY_FILL_OPACITY,
                DEFAULT_OVERLAY_OUTLINE_WIDTH,
            ))
            .with_nearby_failure(self.nearby.on_failure)
            .with_nearby_paging(self.nearby.page, self.nearby.limit)
            .with_search_strategy(self.sidebar.search)
            .with_max_suggestions(self.sidebar.max_suggestions)
            .with_initial_boundary(self.map.initial_boundary)
    }

    /// Backend locations described by this file.
    pub fn endpoints(&self) -> BackendEndpoints {
        let mut endpoints = BackendEndpoints::new(&self.backend.base_url)
            .with_nearby_endpoint(self.backend.nearby_endpoint)
            .with_demographics_lookup(self.backend.demographics_lookup);
        if let Some(url) = &self.backend.boundary_url {
            endpoints = endpoints.with_boundary_url(url);
        }
        if let Some(dir) = &self.backend.boundary_dir {
            endpoints = endpoints.with_boundary_dir(dir);
        }
        endpoints
    }

    /// HTTP timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }
}

/// Get the path to the config directory (~/.boundaries-explorer).
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".boundaries-explorer")
}

/// Get the path to the config file (~/.boundaries-explorer/config.ini).
pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}
