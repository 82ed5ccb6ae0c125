//! Rendering-surface abstraction
//!
//! The controller never draws. It drives a map surface through the
//! [`RenderSurface`] capability set: sources, layers, paint properties,
//! pointer-event subscriptions, markers, a popup and the cursor. Any map
//! library can sit behind the trait.
//!
//! # Ordering
//!
//! A source may not be removed while a layer still references it. Callers
//! tear layers down first, then the source. [`RecordingSurface`] enforces
//! this and journals every call so tests can assert on the order.

mod recording;
mod types;

pub use recording::{RecordingSurface, SurfaceOp};
pub use types::{
    Cursor, LayerKind, LayerSpec, MarkerId, MarkerRole, MarkerSpec, PaintProperty, PaintValue,
    PointerEventKind, SubscriptionId, SurfaceError,
};

use serde_json::Value;

use crate::geo::LngLat;

/// Capability set of a map rendering surface.
///
/// All operations are synchronous registry mutations; the surface draws on
/// its own schedule.
pub trait RenderSurface: Send {
    /// Registers a GeoJSON source under `id`.
    fn add_source(&mut self, id: &str, data: Value) -> Result<(), SurfaceError>;

    /// Removes a source. Fails with [`SurfaceError::SourceInUse`] while any
    /// layer still draws it.
    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError>;

    /// Registers a layer over an existing source.
    fn add_layer(&mut self, spec: LayerSpec) -> Result<(), SurfaceError>;

    /// Removes a layer.
    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError>;

    /// Sets one paint property on a layer.
    fn set_paint_property(
        &mut self,
        layer_id: &str,
        property: PaintProperty,
        value: PaintValue,
    ) -> Result<(), SurfaceError>;

    /// Asks the surface to deliver `event`, optionally scoped to one layer.
    fn subscribe(
        &mut self,
        event: PointerEventKind,
        layer_id: Option<&str>,
    ) -> Result<SubscriptionId, SurfaceError>;

    /// Stops delivering a subscription. Unknown ids are ignored.
    fn unsubscribe(&mut self, id: SubscriptionId);

    /// Places a marker.
    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId;

    /// Removes a marker.
    fn remove_marker(&mut self, id: MarkerId) -> Result<(), SurfaceError>;

    /// Changes the pointer cursor.
    fn set_cursor(&mut self, cursor: Cursor);

    /// Shows the single hover popup at `position`, replacing any previous one.
    fn show_popup(&mut self, position: LngLat, text: &str);

    /// Hides the hover popup.
    fn hide_popup(&mut self);
}
