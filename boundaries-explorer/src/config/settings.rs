//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use super::{NearbyFailurePolicy, SearchStrategy};
use crate::backend::{DemographicsLookup, NearbyEndpoint};
use crate::model::BoundaryKind;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Backend service location
    pub backend: BackendSettings,
    /// Boundary layer appearance and highlight timing
    pub map: MapSettings,
    /// Nearby-places request and overlay settings
    pub nearby: NearbySettings,
    /// Side-panel search settings
    pub sidebar: SidebarSettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Backend configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSettings {
    /// Base URL of the demographics/nearby/search service
    pub base_url: String,
    /// Host serving `geo_data/{kind}.geo.json` (defaults to `base_url`)
    pub boundary_url: Option<String>,
    /// Local directory holding `{kind}.geo.json`; takes precedence over `boundary_url`
    pub boundary_dir: Option<PathBuf>,
    /// Nearby route: `nearby` or `nearby-redis`
    pub nearby_endpoint: NearbyEndpoint,
    /// Demographics query key: `point` or `geoid`
    pub demographics_lookup: DemographicsLookup,
    /// HTTP timeout in seconds
    pub timeout_secs: u64,
}

/// Map configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MapSettings {
    /// Boundary kind loaded at startup
    pub initial_boundary: BoundaryKind,
    /// Boundary fill color
    pub default_fill_color: String,
    /// Fill color of the clicked feature
    pub highlight_color: String,
    /// Milliseconds before the highlight is reset
    pub highlight_delay_ms: u64,
    /// Samples around the search-radius circle
    pub circle_points: usize,
}

/// Nearby-places configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySettings {
    /// Search radius in meters
    pub radius_m: f64,
    /// Result page requested
    pub page: u32,
    /// Results per page
    pub limit: u32,
    /// What a failed fetch does to the current overlays
    pub on_failure: NearbyFailurePolicy,
    /// Overlay colors, cycled by result index
    pub palette: Vec<String>,
}

/// Sidebar configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct SidebarSettings {
    /// Autocomplete source
    pub search: SearchStrategy,
    /// Suggestions shown in the panel
    pub max_suggestions: usize,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
