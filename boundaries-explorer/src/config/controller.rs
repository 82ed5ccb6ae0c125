//! Controller tuning.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::defaults::*;
use crate::layers::{BoundaryStyle, OverlayStyle, RadiusStyle};
use crate::model::{BoundaryKind, SearchRadius};

/// What a failed nearby-places fetch does to the overlays on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NearbyFailurePolicy {
    /// Treat the failure as an empty result.
    #[default]
    Clear,
    /// Leave the previous overlays in place.
    KeepPrevious,
}

impl fmt::Display for NearbyFailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NearbyFailurePolicy::Clear => write!(f, "clear"),
            NearbyFailurePolicy::KeepPrevious => write!(f, "keep"),
        }
    }
}

impl FromStr for NearbyFailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "clear" => Ok(NearbyFailurePolicy::Clear),
            "keep" | "keep-previous" => Ok(NearbyFailurePolicy::KeepPrevious),
            other => Err(format!("unknown nearby failure policy '{}'", other)),
        }
    }
}

/// Where autocomplete suggestions come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchStrategy {
    /// The backend `/search` endpoint.
    #[default]
    Backend,
    /// Names of the installed boundary dataset.
    LocalNames,
}

impl fmt::Display for SearchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchStrategy::Backend => write!(f, "backend"),
            SearchStrategy::LocalNames => write!(f, "local"),
        }
    }
}

impl FromStr for SearchStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "backend" => Ok(SearchStrategy::Backend),
            "local" | "local-names" => Ok(SearchStrategy::LocalNames),
            other => Err(format!("unknown search strategy '{}'", other)),
        }
    }
}

/// Configuration for the map controller.
///
/// # Example
///
/// ```
/// use boundaries_explorer::config::{ControllerConfig, NearbyFailurePolicy};
/// use std::time::Duration;
///
/// let config = ControllerConfig::default();
/// assert_eq!(config.search_radius().meters(), 30_000.0);
/// assert_eq!(config.highlight_delay(), Duration::from_millis(300));
///
/// let config = ControllerConfig::new()
///     .with_highlight_delay(Duration::from_millis(500))
///     .with_nearby_failure(NearbyFailurePolicy::KeepPrevious);
/// assert_eq!(config.nearby_failure(), NearbyFailurePolicy::KeepPrevious);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ControllerConfig {
    search_radius: SearchRadius,
    highlight_delay: Duration,
    circle_points: usize,
    boundary_style: BoundaryStyle,
    overlay_style: OverlayStyle,
    radius_style: RadiusStyle,
    nearby_failure: NearbyFailurePolicy,
    nearby_page: u32,
    nearby_limit: u32,
    search_strategy: SearchStrategy,
    max_suggestions: usize,
    initial_boundary: BoundaryKind,
}

impl ControllerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the initial search radius.
    pub fn with_search_radius(mut self, radius: SearchRadius) -> Self {
        self.search_radius = radius;
        self
    }

    /// Set how long the clicked feature stays highlighted. Default: 300 ms.
    pub fn with_highlight_delay(mut self, delay: Duration) -> Self {
        self.highlight_delay = delay;
        self
    }

    /// Set the number of samples around the radius circle (minimum 3).
    pub fn with_circle_points(mut self, points: usize) -> Self {
        self.circle_points = points.max(3);
        self
    }

    pub fn with_boundary_style(mut self, style: BoundaryStyle) -> Self {
        self.boundary_style = style;
        self
    }

    pub fn with_overlay_style(mut self, style: OverlayStyle) -> Self {
        self.overlay_style = style;
        self
    }

    pub fn with_radius_style(mut self, style: RadiusStyle) -> Self {
        self.radius_style = style;
        self
    }

    /// Set what a failed nearby fetch does. Default: clear overlays.
    pub fn with_nearby_failure(mut self, policy: NearbyFailurePolicy) -> Self {
        self.nearby_failure = policy;
        self
    }

    /// Set the nearby-places page and page size.
    pub fn with_nearby_paging(mut self, page: u32, limit: u32) -> Self {
        self.nearby_page = page.max(1);
        self.nearby_limit = limit.max(1);
        self
    }

    pub fn with_search_strategy(mut self, strategy: SearchStrategy) -> Self {
        self.search_strategy = strategy;
        self
    }

    /// Set the number of suggestions shown (minimum 1).
    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max.max(1);
        self
    }

    pub fn with_initial_boundary(mut self, kind: BoundaryKind) -> Self {
        self.initial_boundary = kind;
        self
    }

    pub fn search_radius(&self) -> SearchRadius {
        self.search_radius
    }

    pub fn highlight_delay(&self) -> Duration {
        self.highlight_delay
    }

    pub fn circle_points(&self) -> usize {
        self.circle_points
    }

    pub fn boundary_style(&self) -> &BoundaryStyle {
        &self.boundary_style
    }

    pub fn overlay_style(&self) -> &OverlayStyle {
        &self.overlay_style
    }

    pub fn radius_style(&self) -> &RadiusStyle {
        &self.radius_style
    }

    pub fn nearby_failure(&self) -> NearbyFailurePolicy {
        self.nearby_failure
    }

    pub fn nearby_page(&self) -> u32 {
        self.nearby_page
    }

    pub fn nearby_limit(&self) -> u32 {
        self.nearby_limit
    }

    pub fn search_strategy(&self) -> SearchStrategy {
        self.search_strategy
    }

    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }

    pub fn initial_boundary(&self) -> BoundaryKind {
        self.initial_boundary
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            search_radius: SearchRadius::from_meters(DEFAULT_SEARCH_RADIUS_M).unwrap_or_default(),
            highlight_delay: DEFAULT_HIGHLIGHT_DELAY,
            circle_points: DEFAULT_CIRCLE_POINTS,
            boundary_style: BoundaryStyle {
                fill_color: DEFAULT_FILL_COLOR.to_string(),
                fill_opacity: DEFAULT_FILL_OPACITY,
                highlight_color: DEFAULT_HIGHLIGHT_COLOR.to_string(),
                outline_color: DEFAULT_OUTLINE_COLOR.to_string(),
                outline_width: DEFAULT_OUTLINE_WIDTH,
            },
            overlay_style: OverlayStyle::new(
                default_palette(),
                DEFAULT_OVERLAY_FILL_OPACITY,
                DEFAULT_OVERLAY_OUTLINE_WIDTH,
            ),
            radius_style: RadiusStyle {
                fill_color: DEFAULT_RADIUS_FILL_COLOR.to_string(),
                fill_opacity: DEFAULT_RADIUS_FILL_OPACITY,
                ..RadiusStyle::default()
            },
            nearby_failure: NearbyFailurePolicy::default(),
            nearby_page: DEFAULT_NEARBY_PAGE,
            nearby_limit: DEFAULT_NEARBY_LIMIT,
            search_strategy: SearchStrategy::default(),
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            initial_boundary: DEFAULT_INITIAL_BOUNDARY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ControllerConfig::default();
        assert_eq!(config.search_radius().meters(), DEFAULT_SEARCH_RADIUS_M);
        assert_eq!(config.highlight_delay(), Duration::from_millis(300));
        assert_eq!(config.circle_points(), 64);
        assert_eq!(config.boundary_style().fill_color, "#888888");
        assert_eq!(config.overlay_style().palette().len(), 8);
        assert_eq!(config.nearby_failure(), NearbyFailurePolicy::Clear);
        assert_eq!(config.nearby_page(), 1);
        assert_eq!(config.nearby_limit(), 30);
        assert_eq!(config.search_strategy(), SearchStrategy::Backend);
        assert_eq!(config.max_suggestions(), 10);
        assert_eq!(config.initial_boundary(), BoundaryKind::States);
    }

    #[test]
    fn test_new_equals_default() {
        assert_eq!(ControllerConfig::new(), ControllerConfig::default());
    }

    #[test]
    fn test_builder_chain() {
        let config = ControllerConfig::new()
            .with_search_radius(SearchRadius::from_meters(5_000.0).unwrap())
            .with_circle_points(16)
            .with_nearby_paging(2, 50)
            .with_search_strategy(SearchStrategy::LocalNames)
            .with_max_suggestions(5);

        assert_eq!(config.search_radius().kilometers(), 5.0);
        assert_eq!(config.circle_points(), 16);
        assert_eq!(config.nearby_page(), 2);
        assert_eq!(config.nearby_limit(), 50);
        assert_eq!(config.search_strategy(), SearchStrategy::LocalNames);
        assert_eq!(config.max_suggestions(), 5);
        assert_eq!(config.highlight_delay(), DEFAULT_HIGHLIGHT_DELAY); // Unchanged
    }

    #[test]
    fn test_builder_clamps_degenerate_values() {
        let config = ControllerConfig::new()
            .with_circle_points(1)
            .with_nearby_paging(0, 0)
            .with_max_suggestions(0);
        assert_eq!(config.circle_points(), 3);
        assert_eq!(config.nearby_page(), 1);
        assert_eq!(config.nearby_limit(), 1);
        assert_eq!(config.max_suggestions(), 1);
    }

    #[test]
    fn test_policy_names_round_trip_through_display() {
        for policy in [NearbyFailurePolicy::Clear, NearbyFailurePolicy::KeepPrevious] {
            assert_eq!(policy.to_string().parse(), Ok(policy));
        }
        for strategy in [SearchStrategy::Backend, SearchStrategy::LocalNames] {
            assert_eq!(strategy.to_string().parse(), Ok(strategy));
        }
        assert!("sometimes".parse::<NearbyFailurePolicy>().is_err());
    }
}
