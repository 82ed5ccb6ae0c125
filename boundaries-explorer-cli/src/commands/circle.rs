//! Radius polygon output.

use boundaries_explorer::config::ConfigFile;
use boundaries_explorer::geo::{generate_circle, LngLat};

use crate::error::CliError;

/// Arguments for the circle command.
pub struct CircleArgs {
    pub lat: f64,
    pub lng: f64,
    pub radius_km: f64,
    pub points: Option<usize>,
}

/// Print the circle around a point as a GeoJSON feature.
pub fn run(args: CircleArgs) -> Result<(), CliError> {
    let points = match args.points {
        Some(points) => points,
        None => ConfigFile::load()
            .unwrap_or_default()
            .controller_config()
            .circle_points(),
    };

    let polygon = generate_circle(LngLat::new(args.lng, args.lat), args.radius_km, points)?;
    println!("{}", serde_json::to_string_pretty(&polygon.to_feature())?);
    Ok(())
}
