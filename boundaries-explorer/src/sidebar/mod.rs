//! Side-panel view state
//!
//! [`SidebarSyncState`] derives what the demographics/search panel shows from
//! the controller's published state: the selected year (defaulting to the
//! newest one in each new record), that year's figures, and capped
//! autocomplete suggestions.
//!
//! Suggestions come from an [`Autocomplete`] source. Which one is fixed per
//! deployment through [`crate::config::SearchStrategy`]; see
//! [`SuggestionSource::for_strategy`].

mod autocomplete;
mod state;

pub use autocomplete::{Autocomplete, BackendSearch, LocalNameIndex, SuggestionSource};
pub use state::{SidebarError, SidebarSyncState, SidebarView};
