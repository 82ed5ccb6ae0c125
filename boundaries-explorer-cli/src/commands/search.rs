//! Autocomplete suggestions.

use boundaries_explorer::backend::Backend;
use boundaries_explorer::config::SearchStrategy;
use boundaries_explorer::model::BoundaryKind;
use boundaries_explorer::session::Outcome;
use boundaries_explorer::sidebar::{LocalNameIndex, SidebarSyncState, SuggestionSource};
use tracing::info;

use crate::error::CliError;
use crate::runner::CliRunner;

pub async fn run(runner: &CliRunner, query: &str, kind: BoundaryKind) -> Result<(), CliError> {
    runner.log_startup("search");
    let backend = runner.create_backend()?;
    let config = runner.config().controller_config();
    let strategy = config.search_strategy();

    let names = match strategy {
        SearchStrategy::LocalNames => {
            LocalNameIndex::from_dataset(&backend.boundary_dataset(kind).await?)
        }
        SearchStrategy::Backend => LocalNameIndex::default(),
    };
    info!(%strategy, %kind, query, "Searching");

    let sidebar = SidebarSyncState::new(config.max_suggestions());
    let source = SuggestionSource::for_strategy(strategy, &backend, &names);
    let held = match sidebar.search(&source, kind, query).await? {
        Outcome::Current(held) => held,
        Outcome::Discarded { .. } => 0,
    };

    let view = sidebar.derive_state(None, query);
    if view.autocomplete_results.is_empty() {
        println!("No {} match '{}'", kind, query.trim());
        return Ok(());
    }
    for hit in &view.autocomplete_results {
        println!("{:<40} {}", hit.name, hit.geo_id);
    }
    if held > view.autocomplete_results.len() {
        println!("({} more not shown)", held - view.autocomplete_results.len());
    }
    Ok(())
}
