//! CLI runner for common setup and operations.
//!
//! Encapsulates config loading, logging initialization and controller
//! construction to reduce duplication across command handlers.

use std::sync::Arc;

use boundaries_explorer::backend::{AsyncReqwestClient, HttpBackend};
use boundaries_explorer::config::ConfigFile;
use boundaries_explorer::controller::MapController;
use boundaries_explorer::log::TracingLogger;
use boundaries_explorer::logging::{init_logging, split_log_path, LoggingGuard};
use boundaries_explorer::surface::RecordingSurface;
use tracing::info;

use crate::error::CliError;

/// Backend used by the CLI.
pub type CliBackend = HttpBackend<AsyncReqwestClient>;

/// Controller driving an in-memory surface against the configured backend.
pub type CliController = MapController<RecordingSurface, CliBackend>;

/// Runner that manages CLI lifecycle and common operations.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    /// Loaded configuration file
    config: ConfigFile,
}

impl CliRunner {
    /// Load config and initialize logging.
    ///
    /// Logs go to the configured file. `verbose` mirrors them to stdout;
    /// `debug` lowers the default level to debug.
    pub fn new(verbose: bool, debug: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let (log_dir, log_file) = split_log_path(&config.logging.file);
        let logging_guard = init_logging(&log_dir, &log_file, verbose, debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Log startup information for a command.
    pub fn log_startup(&self, command: &str) {
        info!("Boundaries Explorer v{}", boundaries_explorer::VERSION);
        info!("Boundaries Explorer CLI: {} command", command);
        info!(base_url = %self.config.backend.base_url, "Using backend");
    }

    /// Create the HTTP backend described by the config.
    pub fn create_backend(&self) -> Result<CliBackend, CliError> {
        let client =
            AsyncReqwestClient::with_timeout(self.config.timeout()).map_err(CliError::ClientCreation)?;
        Ok(HttpBackend::new(client, self.config.endpoints()))
    }

    /// Create a controller over a fresh recording surface.
    pub fn create_controller(&self) -> Result<CliController, CliError> {
        let backend = self.create_backend()?;
        let controller = MapController::new(
            RecordingSurface::new(),
            backend,
            self.config.controller_config(),
            Arc::new(TracingLogger),
        );
        info!("Controller created");
        Ok(controller)
    }
}
