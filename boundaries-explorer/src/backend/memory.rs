//! Scripted in-memory backend.
//!
//! Serves datasets, demographics, nearby places and search hits from memory,
//! with optional per-call delays and queued one-shot responses. Used by
//! offline hosts and by tests that need to control resolution order.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::client::{Backend, DemographicsTarget, NearbyQuery};
use super::error::NetworkError;
use crate::model::{BoundaryDataset, BoundaryKind, DemographicRecord, NearbyPlace, SearchHit};

/// A backend call as observed by [`InMemoryBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    BoundaryDataset(BoundaryKind),
    Demographics(DemographicsTarget),
    NearbyPlaces(NearbyQuery),
    Search { kind: BoundaryKind, query: String },
}

struct Scripted<T> {
    delay: Duration,
    result: Result<T, NetworkError>,
}

struct State {
    datasets: HashMap<BoundaryKind, Result<BoundaryDataset, NetworkError>>,
    dataset_delays: HashMap<BoundaryKind, Duration>,
    demographics: Result<Option<DemographicRecord>, NetworkError>,
    demographics_queue: VecDeque<Scripted<Option<DemographicRecord>>>,
    nearby: Result<Vec<NearbyPlace>, NetworkError>,
    nearby_queue: VecDeque<Scripted<Vec<NearbyPlace>>>,
    search_hits: Vec<SearchHit>,
    search_queue: VecDeque<Scripted<Vec<SearchHit>>>,
    fetch_delay: Duration,
    calls: Vec<BackendCall>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            datasets: HashMap::new(),
            dataset_delays: HashMap::new(),
            demographics: Ok(None),
            demographics_queue: VecDeque::new(),
            nearby: Ok(Vec::new()),
            nearby_queue: VecDeque::new(),
            search_hits: Vec::new(),
            search_queue: VecDeque::new(),
            fetch_delay: Duration::ZERO,
            calls: Vec::new(),
        }
    }
}

/// [`Backend`] answering from memory.
///
/// Clones share the same script and call log.
#[derive(Clone, Default)]
pub struct InMemoryBackend {
    state: Arc<Mutex<State>>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Serves `dataset` for its kind.
    pub fn insert_dataset(&self, dataset: BoundaryDataset) {
        self.state().datasets.insert(dataset.kind(), Ok(dataset));
    }

    /// Fails every load of `kind` with `error`.
    pub fn fail_dataset(&self, kind: BoundaryKind, error: NetworkError) {
        self.state().datasets.insert(kind, Err(error));
    }

    /// Delays loads of `kind`.
    pub fn set_dataset_delay(&self, kind: BoundaryKind, delay: Duration) {
        self.state().dataset_delays.insert(kind, delay);
    }

    /// Default demographics answer, used when no queued response remains.
    pub fn set_demographics(&self, result: Result<Option<DemographicRecord>, NetworkError>) {
        self.state().demographics = result;
    }

    /// Queues a one-shot demographics answer resolved after `delay`.
    pub fn push_demographics_response(
        &self,
        delay: Duration,
        result: Result<Option<DemographicRecord>, NetworkError>,
    ) {
        self.state()
            .demographics_queue
            .push_back(Scripted { delay, result });
    }

    /// Default nearby-places answer, used when no queued response remains.
    pub fn set_nearby(&self, result: Result<Vec<NearbyPlace>, NetworkError>) {
        self.state().nearby = result;
    }

    /// Queues a one-shot nearby-places answer resolved after `delay`.
    pub fn push_nearby_response(
        &self,
        delay: Duration,
        result: Result<Vec<NearbyPlace>, NetworkError>,
    ) {
        self.state().nearby_queue.push_back(Scripted { delay, result });
    }

    /// Names searchable by [`Backend::search`].
    pub fn set_search_hits(&self, hits: Vec<SearchHit>) {
        self.state().search_hits = hits;
    }

    /// Queues a one-shot search answer resolved after `delay`.
    pub fn push_search_response(&self, delay: Duration, result: Result<Vec<SearchHit>, NetworkError>) {
        self.state().search_queue.push_back(Scripted { delay, result });
    }

    /// Delay applied to unscripted demographics, nearby and search calls.
    pub fn set_fetch_delay(&self, delay: Duration) {
        self.state().fetch_delay = delay;
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<BackendCall> {
        self.state().calls.clone()
    }

    pub fn demographics_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, BackendCall::Demographics(_)))
            .count()
    }

    pub fn nearby_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|c| matches!(c, BackendCall::NearbyPlaces(_)))
            .count()
    }
}

async fn resolve<T>(delay: Duration, result: Result<T, NetworkError>) -> Result<T, NetworkError> {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    result
}

impl Backend for InMemoryBackend {
    async fn boundary_dataset(&self, kind: BoundaryKind) -> Result<BoundaryDataset, NetworkError> {
        let (delay, result) = {
            let mut state = self.state();
            state.calls.push(BackendCall::BoundaryDataset(kind));
            let delay = state
                .dataset_delays
                .get(&kind)
                .copied()
                .unwrap_or(Duration::ZERO);
            let result = state.datasets.get(&kind).cloned().unwrap_or_else(|| {
                Err(NetworkError::Status {
                    status: 404,
                    url: format!("geo_data/{}.geo.json", kind),
                })
            });
            (delay, result)
        };
        resolve(delay, result).await
    }

    async fn demographics(
        &self,
        target: &DemographicsTarget,
    ) -> Result<Option<DemographicRecord>, NetworkError> {
        let (delay, result) = {
            let mut state = self.state();
            state.calls.push(BackendCall::Demographics(target.clone()));
            match state.demographics_queue.pop_front() {
                Some(scripted) => (scripted.delay, scripted.result),
                None => (state.fetch_delay, state.demographics.clone()),
            }
        };
        resolve(delay, result).await
    }

    async fn nearby_places(&self, query: &NearbyQuery) -> Result<Vec<NearbyPlace>, NetworkError> {
        let (delay, result) = {
            let mut state = self.state();
            state.calls.push(BackendCall::NearbyPlaces(query.clone()));
            match state.nearby_queue.pop_front() {
                Some(scripted) => (scripted.delay, scripted.result),
                None => (state.fetch_delay, state.nearby.clone()),
            }
        };
        resolve(delay, result).await
    }

    async fn search(&self, kind: BoundaryKind, query: &str) -> Result<Vec<SearchHit>, NetworkError> {
        let (delay, result) = {
            let mut state = self.state();
            state.calls.push(BackendCall::Search {
                kind,
                query: query.to_string(),
            });
            match state.search_queue.pop_front() {
                Some(scripted) => (scripted.delay, scripted.result),
                None => {
                    let needle = query.to_lowercase();
                    let hits = state
                        .search_hits
                        .iter()
                        .filter(|hit| hit.name.to_lowercase().contains(&needle))
                        .cloned()
                        .collect();
                    (state.fetch_delay, Ok(hits))
                }
            }
        };
        resolve(delay, result).await
    }
}
