//! Controller events, published state and errors.

use std::sync::Arc;

use thiserror::Error;

use crate::backend::NetworkError;
use crate::geo::{GeoError, LngLat};
use crate::layers::RadiusCircle;
use crate::model::{
    BoundaryKind, DemographicRecord, FeatureHit, NearbyPlace, SearchRadius, SelectionPoint,
};
use crate::session::Generation;
use crate::sidebar::LocalNameIndex;
use crate::surface::SurfaceError;

/// A pointer event delivered by the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    /// Pointer moved over a layer. `feature` is the hit reported by the
    /// surface, if it resolved one.
    Move {
        layer_id: String,
        position: LngLat,
        feature: Option<FeatureHit>,
    },
    Enter {
        layer_id: String,
    },
    Leave {
        layer_id: String,
    },
    /// Click on the map. `layer_id` is `None` for clicks outside any layer.
    Click {
        layer_id: Option<String>,
        position: LngLat,
        feature: Option<FeatureHit>,
    },
}

/// Whether the latest click still has fetches in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionPhase {
    #[default]
    Idle,
    Pending,
}

/// How one click-triggered fetch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStatus {
    /// The response was applied to the published state.
    Applied,
    /// The fetch failed; the failure was logged.
    Failed,
    /// A newer session or click superseded the response.
    Discarded,
}

/// Result of [`MapController::handle_click`](super::MapController::handle_click).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickReport {
    pub demographics: FetchStatus,
    pub nearby: FetchStatus,
}

/// Snapshot of everything the controller publishes.
#[derive(Debug, Clone)]
pub struct MapState {
    /// Kind of the installed boundary dataset.
    pub kind: Option<BoundaryKind>,
    pub generation: Generation,
    pub selection: Option<SelectionPoint>,
    /// Feature under the latest click, if any.
    pub selected_feature: Option<FeatureHit>,
    pub phase: SelectionPhase,
    pub demographics: Option<DemographicRecord>,
    /// Result list of the latest applied nearby fetch.
    pub nearby: Vec<NearbyPlace>,
    pub hovered: Option<String>,
    pub search_radius: SearchRadius,
    pub radius_circle: Option<RadiusCircle>,
    /// Names of the installed dataset, for local autocomplete.
    pub names: Arc<LocalNameIndex>,
}

impl MapState {
    pub(crate) fn new(generation: Generation, search_radius: SearchRadius) -> Self {
        Self {
            kind: None,
            generation,
            selection: None,
            selected_feature: None,
            phase: SelectionPhase::Idle,
            demographics: None,
            nearby: Vec::new(),
            hovered: None,
            search_radius,
            radius_circle: None,
            names: Arc::new(LocalNameIndex::default()),
        }
    }
}

/// Errors returned by controller operations.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Geometry(#[from] GeoError),

    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Search radius must be a positive number of meters, got {0}")]
    InvalidRadius(f64),

    #[error("Controller has been shut down")]
    ShutDown,
}
