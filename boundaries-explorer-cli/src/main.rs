//! Boundaries Explorer CLI - Command-line interface
//!
//! A headless driver for the boundaries explorer library: it runs the map
//! controller against the configured backend on an in-memory surface and
//! prints what the map and side panel would show.

mod commands;
mod error;
mod runner;

use clap::{Parser, Subcommand};
use boundaries_explorer::model::BoundaryKind;

use commands::circle::CircleArgs;
use commands::config::ConfigCommands;
use commands::inspect::InspectArgs;
use error::CliError;
use runner::CliRunner;

#[derive(Parser)]
#[command(name = "boundaries-explorer")]
#[command(version = boundaries_explorer::VERSION)]
#[command(about = "Explore boundary datasets, demographics and nearby places", long_about = None)]
struct Cli {
    /// Mirror log output to stdout
    #[arg(long, global = true)]
    verbose: bool,

    /// Default to debug-level logging when RUST_LOG is unset
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the search-radius polygon around a point as GeoJSON
    Circle {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Radius in kilometers
        #[arg(long)]
        radius_km: f64,

        /// Number of points around the circle (default from config)
        #[arg(long)]
        points: Option<usize>,
    },

    /// Load a boundary dataset, click a point and print the result
    Inspect {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Boundary kind: states, counties or regions (default from config)
        #[arg(long)]
        kind: Option<BoundaryKind>,

        /// Search radius in meters (default from config)
        #[arg(long)]
        radius_m: Option<f64>,
    },

    /// Print autocomplete suggestions for a query
    Search {
        /// Text typed into the search box
        query: String,

        /// Boundary kind to search
        #[arg(long, default_value = "counties")]
        kind: BoundaryKind,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Circle {
            lat,
            lng,
            radius_km,
            points,
        } => commands::circle::run(CircleArgs {
            lat,
            lng,
            radius_km,
            points,
        }),
        Commands::Config(command) => commands::config::run(command),
        Commands::Inspect {
            lat,
            lng,
            kind,
            radius_m,
        } => {
            let runner = CliRunner::new(cli.verbose, cli.debug)?;
            block_on(commands::inspect::run(
                &runner,
                InspectArgs {
                    lat,
                    lng,
                    kind,
                    radius_m,
                },
            ))
        }
        Commands::Search { query, kind } => {
            let runner = CliRunner::new(cli.verbose, cli.debug)?;
            block_on(commands::search::run(&runner, &query, kind))
        }
    }
}

fn block_on<F>(future: F) -> Result<(), CliError>
where
    F: std::future::Future<Output = Result<(), CliError>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(future)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_inspect_accepts_negative_longitude() {
        let cli = Cli::try_parse_from([
            "boundaries-explorer",
            "inspect",
            "--lat",
            "43.41",
            "--lng",
            "-99.73",
            "--kind",
            "counties",
        ])
        .unwrap();

        match cli.command {
            Commands::Inspect { lng, kind, .. } => {
                assert_eq!(lng, -99.73);
                assert_eq!(kind, Some(BoundaryKind::Counties));
            }
            _ => panic!("expected inspect"),
        }
    }

    #[test]
    fn test_search_defaults_to_counties() {
        let cli = Cli::try_parse_from(["boundaries-explorer", "search", "hughes"]).unwrap();
        match cli.command {
            Commands::Search { query, kind } => {
                assert_eq!(query, "hughes");
                assert_eq!(kind, BoundaryKind::Counties);
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let result = Cli::try_parse_from([
            "boundaries-explorer",
            "search",
            "hughes",
            "--kind",
            "parishes",
        ]);
        assert!(result.is_err());
    }
}
