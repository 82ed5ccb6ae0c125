//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants and the `ConfigFile::default()`
//! implementation.

use std::path::PathBuf;
use std::time::Duration;

use super::file::config_directory;
use super::settings::*;
use super::{NearbyFailurePolicy, SearchStrategy};
use crate::backend::{DemographicsLookup, NearbyEndpoint, DEFAULT_BASE_URL};
use crate::layers::DEFAULT_PALETTE;
use crate::model::BoundaryKind;

// =============================================================================
// Backend
// =============================================================================

/// Environment variable overriding `backend.base_url`.
pub const BASE_URL_ENV: &str = "BOUNDARIES_EXPLORER_BASE_URL";

/// Default HTTP timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Map
// =============================================================================

/// Boundary kind shown at startup.
pub const DEFAULT_INITIAL_BOUNDARY: BoundaryKind = BoundaryKind::States;

/// Boundary fill color.
pub const DEFAULT_FILL_COLOR: &str = "#888888";

/// Boundary fill opacity.
pub const DEFAULT_FILL_OPACITY: f64 = 0.5;

/// Fill color of the clicked feature while highlighted.
pub const DEFAULT_HIGHLIGHT_COLOR: &str = "#ff8c00";

/// Boundary outline color.
pub const DEFAULT_OUTLINE_COLOR: &str = "#000000";

/// Boundary outline width.
pub const DEFAULT_OUTLINE_WIDTH: f64 = 2.0;

/// Delay before the highlight fill is reset, in milliseconds.
pub const DEFAULT_HIGHLIGHT_DELAY_MS: u64 = 300;

/// Delay before the highlight fill is reset.
pub const DEFAULT_HIGHLIGHT_DELAY: Duration = Duration::from_millis(DEFAULT_HIGHLIGHT_DELAY_MS);

/// Samples around the search-radius circle.
pub const DEFAULT_CIRCLE_POINTS: usize = crate::geo::DEFAULT_CIRCLE_POINTS;

/// Search-radius circle fill.
pub const DEFAULT_RADIUS_FILL_COLOR: &str = "#1e90ff";

/// Search-radius circle opacity.
pub const DEFAULT_RADIUS_FILL_OPACITY: f64 = 0.15;

// =============================================================================
// Nearby places
// =============================================================================

/// Search radius in meters.
pub const DEFAULT_SEARCH_RADIUS_M: f64 = 30_000.0;

/// First result page requested.
pub const DEFAULT_NEARBY_PAGE: u32 = 1;

/// Results per page.
pub const DEFAULT_NEARBY_LIMIT: u32 = 30;

/// Overlay fill opacity.
pub const DEFAULT_OVERLAY_FILL_OPACITY: f64 = 0.4;

/// Overlay outline width.
pub const DEFAULT_OVERLAY_OUTLINE_WIDTH: f64 = 2.0;

// =============================================================================
// Sidebar
// =============================================================================

/// Autocomplete suggestions shown in the panel.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 10;

/// Default overlay palette as owned strings.
pub fn default_palette() -> Vec<String> {
    DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

/// Default log file (~/.boundaries-explorer/boundaries-explorer.log).
pub fn default_log_file() -> PathBuf {
    config_directory().join("boundaries-explorer.log")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            backend: BackendSettings {
                base_url: DEFAULT_BASE_URL.to_string(),
                boundary_url: None,
                boundary_dir: None,
                nearby_endpoint: NearbyEndpoint::default(),
                demographics_lookup: DemographicsLookup::default(),
                timeout_secs: DEFAULT_TIMEOUT_SECS,
            },
            map: MapSettings {
                initial_boundary: DEFAULT_INITIAL_BOUNDARY,
                default_fill_color: DEFAULT_FILL_COLOR.to_string(),
                highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
                highlight_delay_ms: DEFAULT_HIGHLIGHT_DELAY_MS,
                circle_points: DEFAULT_CIRCLE_POINTS,
            },
            nearby: NearbySettings {
                radius_m: DEFAULT_SEARCH_RADIUS_M,
                page: DEFAULT_NEARBY_PAGE,
                limit: DEFAULT_NEARBY_LIMIT,
                on_failure: NearbyFailurePolicy::default(),
                palette: default_palette(),
            },
            sidebar: SidebarSettings {
                search: SearchStrategy::default(),
                max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            },
            logging: LoggingSettings {
                file: default_log_file(),
            },
        }
    }
}
