//! Sidebar view derivation.

use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

use super::autocomplete::Autocomplete;
use crate::backend::NetworkError;
use crate::model::{BoundaryKind, DemographicRecord, DemographicYear, SearchHit};
use crate::session::{Outcome, RequestCoordinator};

/// Rejected panel input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SidebarError {
    #[error("year {year} is not available{}", describe_range(*range))]
    OutOfRange {
        year: u16,
        /// Inclusive range of the observed record, `None` when no record is shown.
        range: Option<(u16, u16)>,
    },
}

fn describe_range(range: Option<(u16, u16)>) -> String {
    match range {
        Some((first, last)) => format!(" (data covers {}-{})", first, last),
        None => " (no demographics loaded)".to_string(),
    }
}

/// What the panel renders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SidebarView {
    pub selected_year: Option<u16>,
    pub visible_year_data: Option<DemographicYear>,
    /// At most `max_suggestions` entries.
    pub autocomplete_results: Vec<SearchHit>,
}

#[derive(Debug, Default)]
struct Inner {
    observed: Option<DemographicRecord>,
    selected_year: Option<u16>,
    results_term: Option<String>,
    results: Vec<SearchHit>,
}

/// Panel state kept consistent with the map selection.
///
/// Methods take `&self`; concurrent searches are ordered by an internal
/// [`RequestCoordinator`] so only the newest search's results are kept.
#[derive(Debug)]
pub struct SidebarSyncState {
    inner: Mutex<Inner>,
    searches: RequestCoordinator,
    max_suggestions: usize,
}

impl SidebarSyncState {
    pub fn new(max_suggestions: usize) -> Self {
        Self {
            inner: Mutex::new(Inner::default()),
            searches: RequestCoordinator::new(),
            max_suggestions: max_suggestions.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn max_suggestions(&self) -> usize {
        self.max_suggestions
    }

    /// Derives the panel view for `record` and the current search box text.
    ///
    /// A record that differs from the one seen last resets the selection to
    /// its newest year. Suggestions are shown only for the term they were
    /// fetched for.
    pub fn derive_state(&self, record: Option<&DemographicRecord>, search_term: &str) -> SidebarView {
        let mut inner = self.lock();

        if inner.observed.as_ref() != record {
            inner.observed = record.cloned();
            inner.selected_year = record.and_then(DemographicRecord::latest_year);
        }

        let visible_year_data = match (record, inner.selected_year) {
            (Some(record), Some(year)) => record.year(year).cloned(),
            _ => None,
        };

        let term = search_term.trim();
        let autocomplete_results = if !term.is_empty() && inner.results_term.as_deref() == Some(term) {
            inner
                .results
                .iter()
                .take(self.max_suggestions)
                .cloned()
                .collect()
        } else {
            Vec::new()
        };

        SidebarView {
            selected_year: inner.selected_year,
            visible_year_data,
            autocomplete_results,
        }
    }

    /// Selects a year of the observed record.
    ///
    /// # Errors
    ///
    /// [`SidebarError::OutOfRange`] when the record has no figures for `year`.
    pub fn set_selected_year(&self, year: u16) -> Result<u16, SidebarError> {
        let mut inner = self.lock();
        let Some(record) = inner.observed.as_ref() else {
            return Err(SidebarError::OutOfRange { year, range: None });
        };
        if !record.contains_year(year) {
            return Err(SidebarError::OutOfRange {
                year,
                range: record.year_range(),
            });
        }
        inner.selected_year = Some(year);
        Ok(year)
    }

    pub fn selected_year(&self) -> Option<u16> {
        self.lock().selected_year
    }

    /// Runs a search and keeps the full result list.
    ///
    /// Returns the number of results held, or [`Outcome::Discarded`] when a
    /// newer search started before this one finished. A blank term clears
    /// the results without querying.
    pub async fn search<A>(
        &self,
        source: &A,
        kind: BoundaryKind,
        term: &str,
    ) -> Result<Outcome<usize>, NetworkError>
    where
        A: Autocomplete + ?Sized,
    {
        let term = term.trim();
        let generation = self.searches.advance();

        if term.is_empty() {
            let mut inner = self.lock();
            inner.results.clear();
            inner.results_term = None;
            return Ok(Outcome::Current(0));
        }

        match self.searches.issue(generation, source.suggest(kind, term)).await {
            Outcome::Discarded { issued, current } => Ok(Outcome::Discarded { issued, current }),
            Outcome::Current(Err(e)) => Err(e),
            Outcome::Current(Ok(hits)) => {
                let mut inner = self.lock();
                let current = self.searches.current();
                if current != generation {
                    return Ok(Outcome::Discarded {
                        issued: generation,
                        current,
                    });
                }
                let held = hits.len();
                inner.results = hits;
                inner.results_term = Some(term.to_string());
                Ok(Outcome::Current(held))
            }
        }
    }

    /// Number of results held, before the display cap.
    pub fn held_results(&self) -> usize {
        self.lock().results.len()
    }
}

impl Default for SidebarSyncState {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_SUGGESTIONS)
    }
}
