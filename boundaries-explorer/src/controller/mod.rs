//! Selection controller
//!
//! [`MapController`] is the single owner of the rendering surface, the boundary
//! and overlay managers, the selection marker and the session generation. It
//! turns pointer events into surface mutations and backend fetches, and
//! publishes the resulting [`MapState`] on a `watch` channel.
//!
//! # Concurrency
//!
//! The controller is a cheap `Clone` handle. Surface and managers sit behind
//! one mutex that is never held across an `.await`, so every continuation
//! applies its mutation in one step and no observer sees a half-replaced
//! overlay set.
//!
//! Each fetch is tagged with the session [`Generation`] current when it was
//! issued. `set_dataset` and `shutdown` advance the generation; responses
//! issued under an older one are discarded on arrival. Within one generation,
//! a click's response is dropped once a newer click's response for the same
//! field has been applied.
//!
//! # Example
//!
//! ```
//! use boundaries_explorer::backend::InMemoryBackend;
//! use boundaries_explorer::config::ControllerConfig;
//! use boundaries_explorer::controller::MapController;
//! use boundaries_explorer::geo::LngLat;
//! use boundaries_explorer::log::NoOpLogger;
//! use boundaries_explorer::surface::RecordingSurface;
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let controller = MapController::new(
//!     RecordingSurface::new(),
//!     InMemoryBackend::new(),
//!     ControllerConfig::default(),
//!     Arc::new(NoOpLogger),
//! );
//!
//! controller.handle_click(LngLat::new(-99.73, 43.41), None).await.unwrap();
//! let state = controller.state();
//! assert_eq!(state.radius_circle.map(|c| c.radius_km), Some(30.0));
//! # });
//! ```

mod highlight;
mod types;

#[cfg(test)]
mod tests;

pub use types::{ClickReport, ControllerError, FetchStatus, MapState, PointerEvent, SelectionPhase};

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use self::highlight::{HighlightTimer, ResetTicket};
use crate::backend::{Backend, DemographicsTarget, NearbyQuery, NetworkError};
use crate::config::{ControllerConfig, NearbyFailurePolicy};
use crate::geo::{generate_circle, LngLat};
use crate::layers::{BoundaryLayerManager, OverlaySetManager, RadiusCircle, RadiusOverlay};
use crate::log::Logger;
use crate::model::{
    BoundaryKind, DemographicRecord, FeatureHit, NearbyPlace, SearchRadius, SelectionPoint,
};
use crate::session::{Generation, Outcome, RequestCoordinator};
use crate::sidebar::LocalNameIndex;
use crate::surface::{Cursor, MarkerId, MarkerRole, MarkerSpec, RenderSurface, SurfaceError};
use crate::{log_debug, log_error, log_info, log_warn};

struct Inner<S> {
    surface: S,
    boundaries: BoundaryLayerManager,
    overlays: OverlaySetManager,
    radius: RadiusOverlay,
    selection_marker: Option<MarkerId>,
    highlight: HighlightTimer,
    search_radius: SearchRadius,
    /// Sequence number of the latest click.
    click_seq: u64,
    /// Latest click whose nearby results were cleared by an outside click.
    dismissed_click: u64,
    demographics_applied: u64,
    nearby_applied: u64,
    shut_down: bool,
}

struct Shared<S, B> {
    inner: Mutex<Inner<S>>,
    backend: B,
    config: ControllerConfig,
    logger: Arc<dyn Logger>,
    sessions: RequestCoordinator,
    state: watch::Sender<MapState>,
}

/// Owns the map surface and coordinates selection, fetches and overlays.
pub struct MapController<S, B> {
    shared: Arc<Shared<S, B>>,
}

impl<S, B> Clone for MapController<S, B> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S, B> MapController<S, B>
where
    S: RenderSurface + 'static,
    B: Backend + 'static,
{
    pub fn new(surface: S, backend: B, config: ControllerConfig, logger: Arc<dyn Logger>) -> Self {
        let sessions = RequestCoordinator::new();
        let search_radius = config.search_radius();
        let (state, _) = watch::channel(MapState::new(sessions.current(), search_radius));

        let inner = Inner {
            surface,
            boundaries: BoundaryLayerManager::new(config.boundary_style().clone()),
            overlays: OverlaySetManager::new(config.overlay_style().clone()),
            radius: RadiusOverlay::new(config.radius_style().clone()),
            selection_marker: None,
            highlight: HighlightTimer::default(),
            search_radius,
            click_seq: 0,
            dismissed_click: 0,
            demographics_applied: 0,
            nearby_applied: 0,
            shut_down: false,
        };

        Self {
            shared: Arc::new(Shared {
                inner: Mutex::new(inner),
                backend,
                config,
                logger,
                sessions,
                state,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<S>> {
        self.shared
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn publish(&self, modify: impl FnOnce(&mut MapState)) {
        self.shared.state.send_modify(modify);
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<MapState> {
        self.shared.state.subscribe()
    }

    /// Current published state.
    pub fn state(&self) -> MapState {
        self.shared.state.borrow().clone()
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.shared.config
    }

    pub fn backend(&self) -> &B {
        &self.shared.backend
    }

    /// Runs `f` against the rendering surface.
    pub fn with_surface<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.lock().surface)
    }

    /// Number of overlay layers currently drawn for nearby places.
    pub fn overlay_layer_count(&self) -> usize {
        self.lock().overlays.live_layer_count()
    }

    /// Returns true while a highlight reset is scheduled.
    pub fn highlight_pending(&self) -> bool {
        self.lock().highlight.is_pending()
    }

    /// Sets the radius used by subsequent clicks.
    pub fn set_search_radius(&self, meters: f64) -> Result<SearchRadius, ControllerError> {
        let radius = SearchRadius::from_meters(meters).ok_or(ControllerError::InvalidRadius(meters))?;
        let mut inner = self.lock();
        if inner.shut_down {
            return Err(ControllerError::ShutDown);
        }
        inner.search_radius = radius;
        self.publish(|state| state.search_radius = radius);
        Ok(radius)
    }

    /// Loads the configured initial boundary kind.
    pub async fn load_initial_dataset(&self) -> Result<Outcome<()>, ControllerError> {
        self.set_dataset(self.shared.config.initial_boundary()).await
    }

    /// Fetches the dataset for `kind` and swaps it onto the surface.
    ///
    /// Starts a new session: responses to requests issued before this call
    /// are discarded. When a later `set_dataset` starts before this one's
    /// fetch completes, this call returns [`Outcome::Discarded`] without
    /// touching the surface.
    ///
    /// # Errors
    ///
    /// A failed fetch leaves the previous dataset displayed and returns
    /// [`ControllerError::Network`].
    pub async fn set_dataset(&self, kind: BoundaryKind) -> Result<Outcome<()>, ControllerError> {
        if self.lock().shut_down {
            return Err(ControllerError::ShutDown);
        }
        let generation = self.shared.sessions.advance();
        log_debug!(self.shared.logger, "Loading {} boundaries ({})", kind, generation);

        let fetch = self.shared.backend.boundary_dataset(kind);
        let dataset = match self.shared.sessions.issue(generation, fetch).await {
            Outcome::Discarded { issued, current } => {
                log_debug!(
                    self.shared.logger,
                    "Discarded {} boundaries from {} (now {})",
                    kind,
                    issued,
                    current
                );
                return Ok(Outcome::Discarded { issued, current });
            }
            Outcome::Current(Err(e)) => {
                log_warn!(self.shared.logger, "Failed to load {} boundaries: {}", kind, e);
                return Err(e.into());
            }
            Outcome::Current(Ok(dataset)) => dataset,
        };

        let mut guard = self.lock();
        if guard.shut_down {
            return Err(ControllerError::ShutDown);
        }
        let current = self.shared.sessions.current();
        if current != generation {
            return Ok(Outcome::Discarded {
                issued: generation,
                current,
            });
        }

        let inner = &mut *guard;
        let names = Arc::new(LocalNameIndex::from_dataset(&dataset));
        let features = dataset.len();
        inner.highlight.cancel();
        inner.surface.hide_popup();
        if let Err(e) = inner.boundaries.install(&mut inner.surface, dataset) {
            log_error!(self.shared.logger, "Failed to install {} boundaries: {}", kind, e);
            self.publish(|state| {
                state.kind = None;
                state.generation = generation;
                state.hovered = None;
                state.selected_feature = None;
                state.phase = SelectionPhase::Idle;
            });
            return Err(e.into());
        }

        self.publish(|state| {
            state.kind = Some(kind);
            state.generation = generation;
            state.hovered = None;
            state.selected_feature = None;
            state.phase = SelectionPhase::Idle;
            state.names = names;
        });
        log_info!(self.shared.logger, "Installed {} boundaries ({} features)", kind, features);
        Ok(Outcome::Current(()))
    }

    /// Dispatches a pointer event from the surface.
    ///
    /// Never fails: problems are logged so later events still work.
    pub async fn handle_pointer(&self, event: PointerEvent) {
        match event {
            PointerEvent::Move {
                layer_id,
                position,
                feature,
            } => self.on_move(&layer_id, position, feature),
            PointerEvent::Enter { layer_id } => self.on_enter(&layer_id),
            PointerEvent::Leave { layer_id } => self.on_leave(&layer_id),
            PointerEvent::Click {
                position, feature, ..
            } => {
                if let Err(e) = self.handle_click(position, feature).await {
                    log_debug!(self.shared.logger, "Click ignored: {}", e);
                }
            }
        }
    }

    fn on_move(&self, layer_id: &str, position: LngLat, feature: Option<FeatureHit>) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.shut_down || !inner.boundaries.owns_layer(layer_id) {
            return;
        }
        let feature = feature.or_else(|| inner.boundaries.feature_at(position));

        match &feature {
            Some(hit) => {
                let text = inner.boundaries.describe(hit);
                inner.surface.show_popup(position, &text);
            }
            None => inner.surface.hide_popup(),
        }
        let name = feature.map(|f| f.name);
        if inner.boundaries.track_hover(name.as_deref()) {
            self.publish(|state| state.hovered = name);
        }
    }

    fn on_enter(&self, layer_id: &str) {
        let mut inner = self.lock();
        if !inner.shut_down && inner.boundaries.owns_layer(layer_id) {
            inner.surface.set_cursor(Cursor::Pointer);
        }
    }

    fn on_leave(&self, layer_id: &str) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.shut_down || !inner.boundaries.owns_layer(layer_id) {
            return;
        }
        inner.surface.set_cursor(Cursor::Default);
        inner.surface.hide_popup();
        if inner.boundaries.track_hover(None) {
            self.publish(|state| state.hovered = None);
        }
    }

    /// Handles a click at `position`.
    ///
    /// Moves the selection marker, draws the radius circle, highlights the
    /// clicked feature and fetches demographics and nearby places
    /// concurrently. Fetch failures are logged and reported in the returned
    /// [`ClickReport`], never as an error.
    ///
    /// `feature` is the hit reported by the surface. When absent, the
    /// feature is looked up in the installed dataset.
    pub async fn handle_click(
        &self,
        position: LngLat,
        feature: Option<FeatureHit>,
    ) -> Result<ClickReport, ControllerError> {
        let (seq, generation, target, query) = self.begin_click(position, feature)?;

        let (demographics, nearby) = tokio::join!(
            self.fetch_demographics(generation, seq, target),
            self.fetch_nearby(generation, seq, query),
        );

        let inner = self.lock();
        if inner.click_seq == seq {
            self.publish(|state| state.phase = SelectionPhase::Idle);
        }
        Ok(ClickReport {
            demographics,
            nearby,
        })
    }

    fn begin_click(
        &self,
        position: LngLat,
        feature: Option<FeatureHit>,
    ) -> Result<(u64, Generation, DemographicsTarget, NearbyQuery), ControllerError> {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.shut_down {
            return Err(ControllerError::ShutDown);
        }

        inner.click_seq += 1;
        let seq = inner.click_seq;
        let point = SelectionPoint::from(position);
        let feature = feature.or_else(|| inner.boundaries.feature_at(position));
        let radius = inner.search_radius;

        if let Some(marker) = inner.selection_marker.take() {
            match inner.surface.remove_marker(marker) {
                Ok(()) | Err(SurfaceError::UnknownMarker(_)) => {}
                Err(e) => log_warn!(self.shared.logger, "Failed to remove selection marker: {}", e),
            }
        }
        inner.selection_marker = Some(inner.surface.add_marker(MarkerSpec {
            position,
            label: feature.as_ref().map(|f| f.name.clone()),
            role: MarkerRole::Selection,
        }));

        let circle = self.draw_radius(inner, position, radius);

        if let Some((hit, geo_id)) = feature.as_ref().and_then(|f| Some((f, f.geo_id()?))) {
            match inner.boundaries.highlight(&mut inner.surface, geo_id) {
                Ok(true) => {
                    let ticket = inner.highlight.arm();
                    self.schedule_reset(ticket);
                }
                Ok(false) => {}
                Err(e) => log_warn!(self.shared.logger, "Failed to highlight {}: {}", hit.name, e),
            }
        }

        let generation = self.shared.sessions.current();
        let target = DemographicsTarget {
            point,
            geo_id: feature
                .as_ref()
                .and_then(|f| f.geo_id())
                .map(str::to_string),
        };
        let query = NearbyQuery {
            point,
            radius,
            page: self.shared.config.nearby_page(),
            limit: self.shared.config.nearby_limit(),
        };

        self.publish(|state| {
            state.selection = Some(point);
            state.selected_feature = feature;
            state.phase = SelectionPhase::Pending;
            state.radius_circle = circle;
        });
        log_debug!(
            self.shared.logger,
            "Click #{} at ({:.4}, {:.4}) in {}",
            seq,
            point.lat,
            point.lng,
            generation
        );
        Ok((seq, generation, target, query))
    }

    /// Draws the radius circle around `center`.
    ///
    /// Degenerate input aborts only the circle: the previous one is removed
    /// and the rest of the click proceeds.
    fn draw_radius(
        &self,
        inner: &mut Inner<S>,
        center: LngLat,
        radius: SearchRadius,
    ) -> Option<RadiusCircle> {
        let radius_km = radius.kilometers();
        let polygon = match generate_circle(center, radius_km, self.shared.config.circle_points()) {
            Ok(polygon) => polygon,
            Err(e) => {
                log_warn!(self.shared.logger, "Radius circle skipped: {}", e);
                if let Err(e) = inner.radius.clear(&mut inner.surface) {
                    log_warn!(self.shared.logger, "Failed to clear radius circle: {}", e);
                }
                return None;
            }
        };

        let circle = RadiusCircle {
            center,
            radius_km,
            polygon,
        };
        match inner.radius.show(&mut inner.surface, circle.clone()) {
            Ok(()) => Some(circle),
            Err(e) => {
                log_warn!(self.shared.logger, "Failed to draw radius circle: {}", e);
                None
            }
        }
    }

    fn schedule_reset(&self, ticket: ResetTicket) {
        let controller = self.clone();
        let delay = self.shared.config.highlight_delay();
        tokio::spawn(async move {
            tokio::select! {
                _ = ticket.token.cancelled() => {}
                _ = tokio::time::sleep(delay) => controller.reset_highlight(ticket.seq),
            }
        });
    }

    fn reset_highlight(&self, seq: u64) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if !inner.highlight.complete(seq) {
            return;
        }
        if let Err(e) = inner.boundaries.reset_fill(&mut inner.surface) {
            log_warn!(self.shared.logger, "Failed to reset highlight: {}", e);
        }
    }

    async fn fetch_demographics(
        &self,
        generation: Generation,
        seq: u64,
        target: DemographicsTarget,
    ) -> FetchStatus {
        let fetch = self.shared.backend.demographics(&target);
        let record = match self.shared.sessions.issue(generation, fetch).await {
            Outcome::Discarded { .. } => return FetchStatus::Discarded,
            Outcome::Current(Err(e)) => {
                log_warn!(self.shared.logger, "Demographics fetch failed: {}", e);
                return FetchStatus::Failed;
            }
            Outcome::Current(Ok(record)) => record,
        };

        let mut inner = self.lock();
        if !self.accepts(&inner, generation) || inner.demographics_applied > seq {
            return FetchStatus::Discarded;
        }
        inner.demographics_applied = seq;
        self.apply_demographics(record);
        FetchStatus::Applied
    }

    fn apply_demographics(&self, record: Option<DemographicRecord>) {
        match &record {
            Some(r) => log_debug!(self.shared.logger, "Demographics for {} ({})", r.name, r.entity_kind),
            None => log_debug!(self.shared.logger, "No demographics at selection"),
        }
        self.publish(|state| state.demographics = record);
    }

    async fn fetch_nearby(&self, generation: Generation, seq: u64, query: NearbyQuery) -> FetchStatus {
        let fetch = self.shared.backend.nearby_places(&query);
        let result = match self.shared.sessions.issue(generation, fetch).await {
            Outcome::Discarded { .. } => return FetchStatus::Discarded,
            Outcome::Current(result) => result,
        };

        let mut guard = self.lock();
        let inner = &mut *guard;
        if !self.accepts(inner, generation) || inner.nearby_applied > seq || inner.dismissed_click >= seq {
            return FetchStatus::Discarded;
        }
        inner.nearby_applied = seq;
        self.apply_nearby(inner, result)
    }

    fn apply_nearby(
        &self,
        inner: &mut Inner<S>,
        result: Result<Vec<NearbyPlace>, NetworkError>,
    ) -> FetchStatus {
        let (places, status) = match result {
            Ok(places) => (places, FetchStatus::Applied),
            Err(e) => {
                log_warn!(self.shared.logger, "Nearby places fetch failed: {}", e);
                match self.shared.config.nearby_failure() {
                    NearbyFailurePolicy::Clear => (Vec::new(), FetchStatus::Failed),
                    NearbyFailurePolicy::KeepPrevious => return FetchStatus::Failed,
                }
            }
        };

        if let Err(e) = inner.overlays.replace(&mut inner.surface, &places) {
            log_error!(self.shared.logger, "Failed to draw nearby overlays: {}", e);
            if let Err(e) = inner.overlays.clear(&mut inner.surface) {
                log_error!(self.shared.logger, "Failed to clear nearby overlays: {}", e);
            }
            self.publish(|state| state.nearby = Vec::new());
            return FetchStatus::Failed;
        }
        log_debug!(self.shared.logger, "Showing {} nearby places", places.len());
        self.publish(|state| state.nearby = places);
        status
    }

    fn accepts(&self, inner: &Inner<S>, generation: Generation) -> bool {
        !inner.shut_down && self.shared.sessions.is_current(generation)
    }

    /// Handles a click outside the map.
    ///
    /// Clears nearby places and the radius circle. The selection marker and
    /// demographics stay. In-flight nearby results of earlier clicks are
    /// dropped.
    pub fn handle_outside_click(&self) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.shut_down {
            return;
        }
        inner.dismissed_click = inner.click_seq;
        if let Err(e) = inner.overlays.clear(&mut inner.surface) {
            log_warn!(self.shared.logger, "Failed to clear nearby overlays: {}", e);
        }
        if let Err(e) = inner.radius.clear(&mut inner.surface) {
            log_warn!(self.shared.logger, "Failed to clear radius circle: {}", e);
        }
        self.publish(|state| {
            state.nearby = Vec::new();
            state.radius_circle = None;
        });
    }

    /// Tears everything down and stops accepting events.
    ///
    /// Pending responses are discarded and the highlight reset is cancelled.
    /// Every step runs even if an earlier one fails; the first failure is
    /// returned.
    pub fn shutdown(&self) -> Result<(), ControllerError> {
        let generation = self.shared.sessions.reset();
        let mut guard = self.lock();
        let inner = &mut *guard;
        if inner.shut_down {
            return Ok(());
        }
        inner.shut_down = true;
        inner.highlight.cancel();

        let mut first_error: Option<SurfaceError> = None;
        let mut note = |result: Result<(), SurfaceError>| {
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        };

        note(inner.overlays.clear(&mut inner.surface));
        note(inner.radius.clear(&mut inner.surface));
        if let Some(marker) = inner.selection_marker.take() {
            note(match inner.surface.remove_marker(marker) {
                Err(SurfaceError::UnknownMarker(_)) => Ok(()),
                other => other,
            });
        }
        inner.surface.hide_popup();
        inner.surface.set_cursor(Cursor::Default);
        note(inner.boundaries.teardown(&mut inner.surface));

        self.publish(|state| {
            *state = MapState::new(generation, inner.search_radius);
        });
        log_info!(self.shared.logger, "Map controller shut down");

        match first_error {
            Some(e) => {
                log_error!(self.shared.logger, "Teardown incomplete: {}", e);
                Err(e.into())
            }
            None => Ok(()),
        }
    }
}
