//! Simulated click against the configured backend.
//!
//! Loads a boundary dataset onto an in-memory surface, clicks once, and
//! prints what the map and the side panel would show.

use boundaries_explorer::controller::FetchStatus;
use boundaries_explorer::geo::LngLat;
use boundaries_explorer::model::BoundaryKind;
use boundaries_explorer::session::Outcome;
use boundaries_explorer::sidebar::SidebarSyncState;
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the inspect command.
pub struct InspectArgs {
    pub lat: f64,
    pub lng: f64,
    pub kind: Option<BoundaryKind>,
    pub radius_m: Option<f64>,
}

pub async fn run(runner: &CliRunner, args: InspectArgs) -> Result<(), CliError> {
    runner.log_startup("inspect");
    let controller = runner.create_controller()?;
    let kind = args
        .kind
        .unwrap_or_else(|| controller.config().initial_boundary());

    if let Some(meters) = args.radius_m {
        controller.set_search_radius(meters)?;
    }

    println!("Loading {} boundaries...", kind);
    if let Outcome::Discarded { .. } = controller.set_dataset(kind).await? {
        return Err(CliError::Config(format!("{} load was superseded", kind)));
    }

    let position = LngLat::new(args.lng, args.lat);
    info!(%position, "Simulating click");
    let report = controller.handle_click(position, None).await?;
    let state = controller.state();

    println!();
    println!("Selection");
    println!("=========");
    println!("  Point:    {:.5}, {:.5}", args.lat, args.lng);
    match &state.selected_feature {
        Some(feature) => println!(
            "  Feature:  {} ({})",
            feature.name,
            feature.geo_id().unwrap_or("no GEOID")
        ),
        None => println!("  Feature:  (none)"),
    }
    match &state.radius_circle {
        Some(circle) => println!(
            "  Radius:   {} km ({} vertices)",
            circle.radius_km,
            circle.polygon.len()
        ),
        None => println!("  Radius:   (not drawn)"),
    }

    println!();
    println!("Demographics [{}]", describe(report.demographics));
    let sidebar = SidebarSyncState::new(controller.config().max_suggestions());
    let view = sidebar.derive_state(state.demographics.as_ref(), "");
    match (&state.demographics, &view.visible_year_data) {
        (Some(record), Some(year)) => {
            println!("  {} ({})", record.name, record.entity_kind);
            println!("  Year:                    {}", year.year);
            println!("  Total population:        {}", show(year.total_population));
            println!("  Female population:       {}", show(year.female_population));
            println!("  Median gross rent:       {}", show(year.median_gross_rent));
            println!("  Median household income: {}", show(year.median_household_income));
            println!("  Male bachelors 25+:      {}", show(year.male_bachelors_25_plus));
            println!("  Female bachelors 25+:    {}", show(year.female_bachelors_25_plus));
        }
        (Some(record), None) => println!("  {} ({}): no yearly figures", record.name, record.entity_kind),
        (None, _) => println!("  (none)"),
    }

    println!();
    println!("Nearby places [{}]", describe(report.nearby));
    for place in &state.nearby {
        println!("  {:<32} {:>8.2} km", place.name, place.distance_km);
    }
    println!("  Overlay layers: {}", controller.overlay_layer_count());

    println!();
    println!("Surface");
    println!("=======");
    controller.with_surface(|surface| {
        println!("  Sources: {}", surface.source_ids().join(", "));
        println!("  Layers:  {}", surface.layer_ids().join(", "));
        println!("  Markers: {}", surface.marker_count());
    });

    controller.shutdown()?;
    Ok(())
}

fn describe(status: FetchStatus) -> &'static str {
    match status {
        FetchStatus::Applied => "ok",
        FetchStatus::Failed => "failed, see log",
        FetchStatus::Discarded => "superseded",
    }
}

fn show<T: std::fmt::Display>(value: Option<T>) -> String {
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string())
}
