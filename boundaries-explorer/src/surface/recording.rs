//! In-memory rendering surface.
//!
//! Keeps the source/layer/marker registry a real map would keep, rejects the
//! same ordering mistakes a real map rejects, and journals every mutation.
//! Used by headless hosts and by tests.

use std::collections::BTreeMap;

use serde_json::Value;

use super::types::{
    Cursor, LayerSpec, MarkerId, MarkerRole, MarkerSpec, PaintProperty, PaintValue,
    PointerEventKind, SubscriptionId, SurfaceError,
};
use super::RenderSurface;
use crate::geo::LngLat;

/// One journaled surface mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    AddSource(String),
    RemoveSource(String),
    AddLayer(String),
    RemoveLayer(String),
    SetPaint {
        layer: String,
        property: PaintProperty,
    },
    Subscribe(PointerEventKind, Option<String>),
    Unsubscribe(SubscriptionId),
    AddMarker(MarkerId),
    RemoveMarker(MarkerId),
}

/// Registry-only [`RenderSurface`].
#[derive(Debug, Default)]
pub struct RecordingSurface {
    sources: BTreeMap<String, Value>,
    layers: Vec<LayerSpec>,
    subscriptions: BTreeMap<SubscriptionId, (PointerEventKind, Option<String>)>,
    markers: BTreeMap<MarkerId, MarkerSpec>,
    cursor: Cursor,
    popup: Option<(LngLat, String)>,
    next_subscription: u64,
    next_marker: u64,
    journal: Vec<SurfaceOp>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered source ids, sorted.
    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.keys().map(String::as_str).collect()
    }

    pub fn source(&self, id: &str) -> Option<&Value> {
        self.sources.get(id)
    }

    pub fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    /// Registered layer ids, in insertion order.
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    pub fn layer(&self, id: &str) -> Option<&LayerSpec> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn has_layer(&self, id: &str) -> bool {
        self.layer(id).is_some()
    }

    /// Current value of a paint property.
    pub fn paint(&self, layer_id: &str, property: PaintProperty) -> Option<&PaintValue> {
        self.layer(layer_id)?.paint.get(&property)
    }

    pub fn markers(&self) -> impl Iterator<Item = (&MarkerId, &MarkerSpec)> {
        self.markers.iter()
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn markers_with_role(&self, role: MarkerRole) -> Vec<&MarkerSpec> {
        self.markers.values().filter(|m| m.role == role).collect()
    }

    /// Active subscriptions as `(event, layer)` pairs.
    pub fn subscriptions(&self) -> Vec<(PointerEventKind, Option<&str>)> {
        self.subscriptions
            .values()
            .map(|(event, layer)| (*event, layer.as_deref()))
            .collect()
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn popup(&self) -> Option<(LngLat, &str)> {
        self.popup.as_ref().map(|(at, text)| (*at, text.as_str()))
    }

    /// Every mutation since creation or the last [`clear_journal`](Self::clear_journal).
    pub fn journal(&self) -> &[SurfaceOp] {
        &self.journal
    }

    pub fn clear_journal(&mut self) {
        self.journal.clear();
    }

    fn layer_mut(&mut self, id: &str) -> Option<&mut LayerSpec> {
        self.layers.iter_mut().find(|l| l.id == id)
    }
}

impl RenderSurface for RecordingSurface {
    fn add_source(&mut self, id: &str, data: Value) -> Result<(), SurfaceError> {
        if self.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource(id.to_string()));
        }
        self.sources.insert(id.to_string(), data);
        self.journal.push(SurfaceOp::AddSource(id.to_string()));
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError> {
        if !self.sources.contains_key(id) {
            return Err(SurfaceError::UnknownSource(id.to_string()));
        }
        let dependents: Vec<String> = self
            .layers
            .iter()
            .filter(|l| l.source == id)
            .map(|l| l.id.clone())
            .collect();
        if !dependents.is_empty() {
            return Err(SurfaceError::SourceInUse {
                source_id: id.to_string(),
                layers: dependents,
            });
        }
        self.sources.remove(id);
        self.journal.push(SurfaceOp::RemoveSource(id.to_string()));
        Ok(())
    }

    fn add_layer(&mut self, spec: LayerSpec) -> Result<(), SurfaceError> {
        if self.has_layer(&spec.id) {
            return Err(SurfaceError::DuplicateLayer(spec.id));
        }
        if !self.sources.contains_key(&spec.source) {
            return Err(SurfaceError::MissingSource {
                layer: spec.id,
                source_id: spec.source,
            });
        }
        if let Some(property) = spec.paint.keys().find(|p| !p.applies_to(spec.kind)) {
            return Err(SurfaceError::UnsupportedPaint {
                layer: spec.id.clone(),
                property: *property,
            });
        }
        self.journal.push(SurfaceOp::AddLayer(spec.id.clone()));
        self.layers.push(spec);
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError> {
        let index = self
            .layers
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| SurfaceError::UnknownLayer(id.to_string()))?;
        self.layers.remove(index);
        self.journal.push(SurfaceOp::RemoveLayer(id.to_string()));
        Ok(())
    }

    fn set_paint_property(
        &mut self,
        layer_id: &str,
        property: PaintProperty,
        value: PaintValue,
    ) -> Result<(), SurfaceError> {
        let layer = self
            .layer_mut(layer_id)
            .ok_or_else(|| SurfaceError::UnknownLayer(layer_id.to_string()))?;
        if !property.applies_to(layer.kind) {
            return Err(SurfaceError::UnsupportedPaint {
                layer: layer_id.to_string(),
                property,
            });
        }
        layer.paint.insert(property, value);
        self.journal.push(SurfaceOp::SetPaint {
            layer: layer_id.to_string(),
            property,
        });
        Ok(())
    }

    fn subscribe(
        &mut self,
        event: PointerEventKind,
        layer_id: Option<&str>,
    ) -> Result<SubscriptionId, SurfaceError> {
        if let Some(layer) = layer_id {
            if !self.has_layer(layer) {
                return Err(SurfaceError::UnknownLayer(layer.to_string()));
            }
        }
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        let layer = layer_id.map(str::to_string);
        self.subscriptions.insert(id, (event, layer.clone()));
        self.journal.push(SurfaceOp::Subscribe(event, layer));
        Ok(id)
    }

    fn unsubscribe(&mut self, id: SubscriptionId) {
        if self.subscriptions.remove(&id).is_some() {
            self.journal.push(SurfaceOp::Unsubscribe(id));
        }
    }

    fn add_marker(&mut self, marker: MarkerSpec) -> MarkerId {
        self.next_marker += 1;
        let id = MarkerId(self.next_marker);
        self.markers.insert(id, marker);
        self.journal.push(SurfaceOp::AddMarker(id));
        id
    }

    fn remove_marker(&mut self, id: MarkerId) -> Result<(), SurfaceError> {
        self.markers
            .remove(&id)
            .ok_or(SurfaceError::UnknownMarker(id))?;
        self.journal.push(SurfaceOp::RemoveMarker(id));
        Ok(())
    }

    fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    fn show_popup(&mut self, position: LngLat, text: &str) {
        self.popup = Some((position, text.to_string()));
    }

    fn hide_popup(&mut self) {
        self.popup = None;
    }
}
