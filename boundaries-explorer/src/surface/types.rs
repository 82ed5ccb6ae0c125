//! Rendering-surface value types

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Value};
use thiserror::Error;

use crate::geo::LngLat;

/// Geometry type drawn by a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    /// Filled polygon interior.
    Fill,
    /// Polygon outline.
    Line,
}

/// Paint properties the controller sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PaintProperty {
    FillColor,
    FillOpacity,
    LineColor,
    LineWidth,
}

impl PaintProperty {
    /// Style-spec name of the property.
    pub fn as_str(self) -> &'static str {
        match self {
            PaintProperty::FillColor => "fill-color",
            PaintProperty::FillOpacity => "fill-opacity",
            PaintProperty::LineColor => "line-color",
            PaintProperty::LineWidth => "line-width",
        }
    }

    /// Returns true if a layer of `kind` accepts this property.
    pub fn applies_to(self, kind: LayerKind) -> bool {
        match self {
            PaintProperty::FillColor | PaintProperty::FillOpacity => kind == LayerKind::Fill,
            PaintProperty::LineColor | PaintProperty::LineWidth => kind == LayerKind::Line,
        }
    }
}

impl fmt::Display for PaintProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value assigned to a paint property.
#[derive(Debug, Clone, PartialEq)]
pub enum PaintValue {
    /// CSS color string such as `#888888`.
    Color(String),
    /// Numeric value (opacity, width).
    Number(f64),
    /// Conditional color: `matched` where the feature's `property` equals
    /// `value`, `fallback` everywhere else.
    MatchFeature {
        property: String,
        value: String,
        matched: String,
        fallback: String,
    },
}

impl PaintValue {
    pub fn color(color: impl Into<String>) -> Self {
        PaintValue::Color(color.into())
    }

    /// The color a feature with `property_value` would be painted with.
    ///
    /// Returns `None` for numeric values.
    pub fn resolve_color(&self, property_value: Option<&str>) -> Option<&str> {
        match self {
            PaintValue::Color(c) => Some(c),
            PaintValue::Number(_) => None,
            PaintValue::MatchFeature {
                value,
                matched,
                fallback,
                ..
            } => {
                if property_value == Some(value.as_str()) {
                    Some(matched)
                } else {
                    Some(fallback)
                }
            }
        }
    }

    /// Style-spec expression form.
    pub fn to_expression(&self) -> Value {
        match self {
            PaintValue::Color(c) => json!(c),
            PaintValue::Number(n) => json!(n),
            PaintValue::MatchFeature {
                property,
                value,
                matched,
                fallback,
            } => json!(["case", ["==", ["get", property], value], matched, fallback]),
        }
    }
}

/// Layer registration: id, geometry type, backing source and initial paint.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerSpec {
    pub id: String,
    pub kind: LayerKind,
    pub source: String,
    pub paint: BTreeMap<PaintProperty, PaintValue>,
}

impl LayerSpec {
    /// A fill layer drawing `source`.
    pub fn fill(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(id, LayerKind::Fill, source)
    }

    /// An outline layer drawing `source`.
    pub fn line(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self::new(id, LayerKind::Line, source)
    }

    fn new(id: impl Into<String>, kind: LayerKind, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            source: source.into(),
            paint: BTreeMap::new(),
        }
    }

    /// Sets an initial paint property.
    pub fn with_paint(mut self, property: PaintProperty, value: PaintValue) -> Self {
        self.paint.insert(property, value);
        self
    }
}

/// Pointer events a surface can deliver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PointerEventKind {
    Move,
    Enter,
    Leave,
    Click,
}

/// Handle for an event subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// Handle for a placed marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MarkerId(pub u64);

impl fmt::Display for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "marker#{}", self.0)
    }
}

/// What a marker stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRole {
    /// The clicked point.
    Selection,
    /// A nearby-places result.
    Place,
}

/// A marker to place on the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LngLat,
    pub label: Option<String>,
    pub role: MarkerRole,
}

/// Mouse cursor style over the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
}

/// Registry violations reported by a rendering surface.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SurfaceError {
    #[error("source '{0}' already exists")]
    DuplicateSource(String),

    #[error("source '{0}' does not exist")]
    UnknownSource(String),

    #[error("source '{source_id}' is still used by layers {layers:?}")]
    SourceInUse {
        source_id: String,
        layers: Vec<String>,
    },

    #[error("layer '{0}' already exists")]
    DuplicateLayer(String),

    #[error("layer '{0}' does not exist")]
    UnknownLayer(String),

    #[error("layer '{layer}' references missing source '{source_id}'")]
    MissingSource { layer: String, source_id: String },

    #[error("{property} does not apply to layer '{layer}'")]
    UnsupportedPaint {
        layer: String,
        property: PaintProperty,
    },

    #[error("{0} does not exist")]
    UnknownMarker(MarkerId),
}
