//! Configuration for the boundaries explorer.
//!
//! Two layers:
//!
//! - [`ControllerConfig`]: the runtime tuning handed to the map controller,
//!   built with `with_*` methods.
//! - [`ConfigFile`]: the user's `~/.boundaries-explorer/config.ini`, which
//!   projects into a [`ControllerConfig`] and backend endpoints.
//!
//! # Example
//!
//! ```
//! use boundaries_explorer::config::{ConfigFile, SearchStrategy};
//!
//! let file = ConfigFile::default();
//! let controller = file.controller_config();
//! assert_eq!(controller.search_strategy(), SearchStrategy::Backend);
//! assert_eq!(file.endpoints().base_url(), "http://localhost:5002");
//! ```

mod controller;
mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use controller::{ControllerConfig, NearbyFailurePolicy, SearchStrategy};
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{
    BackendSettings, ConfigFile, LoggingSettings, MapSettings, NearbySettings, SidebarSettings,
};

pub use defaults::{
    default_log_file, default_palette, BASE_URL_ENV, DEFAULT_CIRCLE_POINTS, DEFAULT_FILL_COLOR,
    DEFAULT_HIGHLIGHT_COLOR, DEFAULT_HIGHLIGHT_DELAY, DEFAULT_HIGHLIGHT_DELAY_MS,
    DEFAULT_MAX_SUGGESTIONS, DEFAULT_NEARBY_LIMIT, DEFAULT_NEARBY_PAGE, DEFAULT_SEARCH_RADIUS_M,
    DEFAULT_TIMEOUT_SECS,
};
