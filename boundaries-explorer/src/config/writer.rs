//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    let boundary_url = config.backend.boundary_url.as_deref().unwrap_or("");
    let boundary_dir = config
        .backend
        .boundary_dir
        .as_ref()
        .map(|p| path_to_string(p))
        .unwrap_or_default();
    let palette = config
        .nearby
        .palette
        .iter()
        .map(|c| bare_color(c))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"[backend]
; Base URL of the demographics / nearby / search service
; Overridden by the BOUNDARIES_EXPLORER_BASE_URL environment variable
base_url = {}
; Host serving geo_data/{{kind}}.geo.json (empty = same as base_url)
boundary_url = {}
; Local directory holding {{kind}}.geo.json files (empty = fetch over HTTP)
boundary_dir = {}
; Nearby-places route:
;   nearby       - standard endpoint
;   nearby-redis - cached endpoint
nearby_endpoint = {}
; Demographics lookup key:
;   point - query by clicked latitude/longitude
;   geoid - query by the clicked feature's GEOID when one was hit
demographics_lookup = {}
; HTTP timeout in seconds (default: 10)
timeout_secs = {}

[map]
; Boundary kind shown at startup: states, counties or regions
initial_boundary = {}
; Colors are hex without the leading '#'
default_fill_color = {}
highlight_color = {}
; Milliseconds before the clicked feature's highlight is reset (default: 300)
highlight_delay_ms = {}
; Samples around the search-radius circle (default: 64, minimum 3)
circle_points = {}

[nearby]
; Search radius in meters (default: 30000)
radius_m = {}
page = {}
limit = {}
; What a failed nearby fetch does to the overlays on screen:
;   clear - remove them (default)
;   keep  - leave the previous result in place
on_failure = {}
; Overlay colors, cycled by result index
palette = {}

[sidebar]
; Autocomplete source:
;   backend - the /search endpoint (default)
;   local   - names of the loaded boundary dataset
search = {}
; Suggestions shown in the panel (default: 10)
max_suggestions = {}

[logging]
; Log file path
file = {}
"#,
        config.backend.base_url,
        boundary_url,
        boundary_dir,
        config.backend.nearby_endpoint,
        config.backend.demographics_lookup,
        config.backend.timeout_secs,
        config.map.initial_boundary,
        bare_color(&config.map.default_fill_color),
        bare_color(&config.map.highlight_color),
        config.map.highlight_delay_ms,
        config.map.circle_points,
        config.nearby.radius_m,
        config.nearby.page,
        config.nearby.limit,
        config.nearby.on_failure,
        palette,
        config.sidebar.search,
        config.sidebar.max_suggestions,
        path_to_string(&config.logging.file),
    )
}

fn bare_color(color: &str) -> &str {
    color.strip_prefix('#').unwrap_or(color)
}

fn path_to_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
