//! Autocomplete sources.

use std::future::Future;

use crate::backend::{Backend, NetworkError};
use crate::config::SearchStrategy;
use crate::model::{BoundaryDataset, BoundaryKind, SearchHit};

/// Produces name suggestions for a search term.
pub trait Autocomplete: Send + Sync {
    fn suggest(
        &self,
        kind: BoundaryKind,
        term: &str,
    ) -> impl Future<Output = Result<Vec<SearchHit>, NetworkError>> + Send;
}

/// Suggestions from the backend `/search` endpoint.
pub struct BackendSearch<'a, B> {
    backend: &'a B,
}

impl<'a, B: Backend> BackendSearch<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }
}

impl<B: Backend> Autocomplete for BackendSearch<'_, B> {
    async fn suggest(&self, kind: BoundaryKind, term: &str) -> Result<Vec<SearchHit>, NetworkError> {
        self.backend.search(kind, term).await
    }
}

/// Names of the installed boundary dataset.
///
/// Matching is a case-insensitive substring test. Names starting with the
/// term sort first, then everything alphabetically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalNameIndex {
    kind: Option<BoundaryKind>,
    entries: Vec<(String, SearchHit)>,
}

impl LocalNameIndex {
    pub fn from_dataset(dataset: &BoundaryDataset) -> Self {
        let entries = dataset
            .features()
            .iter()
            .filter(|f| !f.name.is_empty())
            .map(|f| {
                (
                    f.name.to_lowercase(),
                    SearchHit::new(f.name.clone(), f.geo_identifier.clone()),
                )
            })
            .collect();
        Self {
            kind: Some(dataset.kind()),
            entries,
        }
    }

    /// Boundary kind the names belong to; `None` before any dataset loads.
    pub fn kind(&self) -> Option<BoundaryKind> {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All names matching `term`, best matches first.
    pub fn lookup(&self, term: &str) -> Vec<SearchHit> {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<&(String, SearchHit)> = self
            .entries
            .iter()
            .filter(|(lower, _)| lower.contains(&needle))
            .collect();
        matches.sort_by(|(a, _), (b, _)| {
            let a_prefix = a.starts_with(&needle);
            let b_prefix = b.starts_with(&needle);
            b_prefix.cmp(&a_prefix).then_with(|| a.cmp(b))
        });
        matches.into_iter().map(|(_, hit)| hit.clone()).collect()
    }
}

impl Autocomplete for LocalNameIndex {
    async fn suggest(&self, kind: BoundaryKind, term: &str) -> Result<Vec<SearchHit>, NetworkError> {
        if self.kind.is_some_and(|k| k != kind) {
            return Ok(Vec::new());
        }
        Ok(self.lookup(term))
    }
}

/// The configured suggestion source.
pub enum SuggestionSource<'a, B> {
    Backend(BackendSearch<'a, B>),
    Local(&'a LocalNameIndex),
}

impl<'a, B: Backend> SuggestionSource<'a, B> {
    pub fn for_strategy(
        strategy: SearchStrategy,
        backend: &'a B,
        names: &'a LocalNameIndex,
    ) -> Self {
        match strategy {
            SearchStrategy::Backend => SuggestionSource::Backend(BackendSearch::new(backend)),
            SearchStrategy::LocalNames => SuggestionSource::Local(names),
        }
    }
}

impl<B: Backend> Autocomplete for SuggestionSource<'_, B> {
    async fn suggest(&self, kind: BoundaryKind, term: &str) -> Result<Vec<SearchHit>, NetworkError> {
        match self {
            SuggestionSource::Backend(search) => search.suggest(kind, term).await,
            SuggestionSource::Local(names) => names.suggest(kind, term).await,
        }
    }
}
