//! Boundaries Explorer - map and sidebar interaction controller
//!
//! This library drives an interactive boundary map: it swaps boundary
//! datasets on a rendering surface, draws a search-radius circle and nearby
//! place overlays around the clicked point, fetches demographics, and keeps a
//! side panel consistent with the selection.
//!
//! # High-Level API
//!
//! [`controller::MapController`] owns the surface and coordinates everything
//! else:
//!
//! ```ignore
//! use boundaries_explorer::backend::{AsyncReqwestClient, HttpBackend};
//! use boundaries_explorer::config::ConfigFile;
//! use boundaries_explorer::controller::MapController;
//! use boundaries_explorer::log::TracingLogger;
//!
//! let config = ConfigFile::load()?;
//! let client = AsyncReqwestClient::with_timeout(config.timeout())?;
//! let backend = HttpBackend::new(client, config.endpoints());
//! let controller = MapController::new(surface, backend, config.controller_config(), Arc::new(TracingLogger));
//!
//! controller.load_initial_dataset().await?;
//! controller.handle_pointer(event).await;
//! ```

pub mod backend;
pub mod config;
pub mod controller;
pub mod geo;
pub mod layers;
pub mod log;
pub mod logging;
pub mod model;
pub mod session;
pub mod sidebar;
pub mod surface;

/// Version of the library and CLI.
///
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
