//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use boundaries_explorer::backend::NetworkError;
use boundaries_explorer::config::ConfigFileError;
use boundaries_explorer::controller::ControllerError;
use boundaries_explorer::geo::GeoError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to create the HTTP client
    ClientCreation(NetworkError),
    /// Backend request failed
    Backend(NetworkError),
    /// Controller operation failed
    Controller(ControllerError),
    /// Invalid circle input
    Geometry(GeoError),
    /// Failed to serialize output
    Output(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::Backend(_)
            | CliError::ClientCreation(_)
            | CliError::Controller(ControllerError::Network(_)) => {
                eprintln!();
                eprintln!("Common issues:");
                eprintln!("  1. Backend not running: the default is http://localhost:5002");
                eprintln!("  2. Wrong URL: set base_url in config.ini or BOUNDARIES_EXPLORER_BASE_URL");
                eprintln!("  3. Boundary files missing: set boundary_dir to a folder of <kind>.geo.json");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::ClientCreation(e) => write!(f, "Failed to create HTTP client: {}", e),
            CliError::Backend(e) => write!(f, "Backend request failed: {}", e),
            CliError::Controller(e) => write!(f, "{}", e),
            CliError::Geometry(e) => write!(f, "{}", e),
            CliError::Output(msg) => write!(f, "Failed to write output: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ClientCreation(e) => Some(e),
            CliError::Backend(e) => Some(e),
            CliError::Controller(e) => Some(e),
            CliError::Geometry(e) => Some(e),
            CliError::Runtime(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ControllerError> for CliError {
    fn from(e: ControllerError) -> Self {
        CliError::Controller(e)
    }
}

impl From<NetworkError> for CliError {
    fn from(e: NetworkError) -> Self {
        CliError::Backend(e)
    }
}

impl From<GeoError> for CliError {
    fn from(e: GeoError) -> Self {
        CliError::Geometry(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
