//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use ini::Ini;
use std::path::PathBuf;
use std::str::FromStr;

use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [backend] section
    if let Some(section) = ini.section(Some("backend")) {
        if let Some(v) = section.get("base_url") {
            let v = v.trim();
            if !is_http_url(v) {
                return Err(invalid("backend", "base_url", v, "must start with http:// or https://"));
            }
            config.backend.base_url = v.to_string();
        }
        if let Some(v) = section.get("boundary_url") {
            let v = v.trim();
            if !v.is_empty() {
                if !is_http_url(v) {
                    return Err(invalid(
                        "backend",
                        "boundary_url",
                        v,
                        "must start with http:// or https://",
                    ));
                }
                config.backend.boundary_url = Some(v.to_string());
            }
        }
        if let Some(v) = section.get("boundary_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.backend.boundary_dir = Some(expand_tilde(v));
            }
        }
        if let Some(v) = section.get("nearby_endpoint") {
            config.backend.nearby_endpoint =
                parse_value("backend", "nearby_endpoint", v, "must be 'nearby' or 'nearby-redis'")?;
        }
        if let Some(v) = section.get("demographics_lookup") {
            config.backend.demographics_lookup =
                parse_value("backend", "demographics_lookup", v, "must be 'point' or 'geoid'")?;
        }
        if let Some(v) = section.get("timeout_secs") {
            let timeout: u64 =
                parse_value("backend", "timeout_secs", v, "must be a positive integer (seconds)")?;
            if timeout == 0 {
                return Err(invalid(
                    "backend",
                    "timeout_secs",
                    v,
                    "must be a positive integer (seconds)",
                ));
            }
            config.backend.timeout_secs = timeout;
        }
    }

    // [map] section
    if let Some(section) = ini.section(Some("map")) {
        if let Some(v) = section.get("initial_boundary") {
            config.map.initial_boundary = parse_value(
                "map",
                "initial_boundary",
                v,
                "must be one of: states, counties, regions",
            )?;
        }
        if let Some(v) = section.get("default_fill_color") {
            config.map.default_fill_color = parse_color("map", "default_fill_color", v)?;
        }
        if let Some(v) = section.get("highlight_color") {
            config.map.highlight_color = parse_color("map", "highlight_color", v)?;
        }
        if let Some(v) = section.get("highlight_delay_ms") {
            config.map.highlight_delay_ms = parse_value(
                "map",
                "highlight_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("circle_points") {
            let points: usize =
                parse_value("map", "circle_points", v, "must be an integer of at least 3")?;
            if points < 3 {
                return Err(invalid("map", "circle_points", v, "must be an integer of at least 3"));
            }
            config.map.circle_points = points;
        }
    }

    // [nearby] section
    if let Some(section) = ini.section(Some("nearby")) {
        if let Some(v) = section.get("radius_m") {
            let radius: f64 =
                parse_value("nearby", "radius_m", v, "must be a positive number of meters")?;
            if !(radius.is_finite() && radius > 0.0) {
                return Err(invalid("nearby", "radius_m", v, "must be a positive number of meters"));
            }
            config.nearby.radius_m = radius;
        }
        if let Some(v) = section.get("page") {
            config.nearby.page = parse_positive("nearby", "page", v)?;
        }
        if let Some(v) = section.get("limit") {
            config.nearby.limit = parse_positive("nearby", "limit", v)?;
        }
        if let Some(v) = section.get("on_failure") {
            config.nearby.on_failure =
                parse_value("nearby", "on_failure", v, "must be 'clear' or 'keep'")?;
        }
        if let Some(v) = section.get("palette") {
            config.nearby.palette = parse_palette(v)?;
        }
    }

    // [sidebar] section
    if let Some(section) = ini.section(Some("sidebar")) {
        if let Some(v) = section.get("search") {
            config.sidebar.search =
                parse_value("sidebar", "search", v, "must be 'backend' or 'local'")?;
        }
        if let Some(v) = section.get("max_suggestions") {
            config.sidebar.max_suggestions = parse_positive::<u32>("sidebar", "max_suggestions", v)? as usize;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

fn invalid(section: &str, key: &str, value: &str, reason: &str) -> ConfigFileError {
    ConfigFileError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, value, reason))
}

fn parse_positive<T>(section: &str, key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr + PartialOrd + From<u8>,
{
    let parsed: T = parse_value(section, key, value, "must be a positive integer")?;
    if parsed < T::from(1) {
        return Err(invalid(section, key, value, "must be a positive integer"));
    }
    Ok(parsed)
}

/// Colors are written without the leading `#`, which INI treats as a comment
/// marker; both forms are accepted.
fn parse_color(section: &str, key: &str, value: &str) -> Result<String, ConfigFileError> {
    let color = value.trim();
    let hex = color.strip_prefix('#').unwrap_or(color);
    if is_hex_color(&format!("#{}", hex)) {
        Ok(format!("#{}", hex.to_lowercase()))
    } else {
        Err(invalid(
            section,
            key,
            value,
            "must be a hex color like 888888 or 888",
        ))
    }
}

fn parse_palette(value: &str) -> Result<Vec<String>, ConfigFileError> {
    let colors: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| parse_color("nearby", "palette", c))
        .collect::<Result<_, _>>()?;
    if colors.is_empty() {
        return Err(invalid(
            "nearby",
            "palette",
            value,
            "must list at least one hex color",
        ));
    }
    Ok(colors)
}

/// Returns true for `#rgb` and `#rrggbb`.
pub(super) fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("http://") || value.starts_with("https://")
}

/// Expand a leading `~/` to the home directory.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}
