//! Nearby-places overlay set.

use serde_json::{json, Value};
use tracing::debug;

use super::tolerate_missing;
use crate::model::NearbyPlace;
use crate::surface::{
    LayerSpec, MarkerId, MarkerRole, MarkerSpec, PaintProperty, PaintValue, RenderSurface,
    SurfaceError,
};

/// Default overlay palette.
pub const DEFAULT_PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#42d4f4", "#f032e6", "#469990",
];

/// Paint applied to overlay sub-boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayStyle {
    palette: Vec<String>,
    fill_opacity: f64,
    outline_width: f64,
}

impl OverlayStyle {
    /// An empty palette falls back to [`DEFAULT_PALETTE`].
    pub fn new(palette: Vec<String>, fill_opacity: f64, outline_width: f64) -> Self {
        let palette = if palette.is_empty() {
            DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
        } else {
            palette
        };
        Self {
            palette,
            fill_opacity,
            outline_width,
        }
    }

    pub fn palette(&self) -> &[String] {
        &self.palette
    }

    /// Color of the overlay at `index`, cycling through the palette.
    pub fn color_for(&self, index: usize) -> &str {
        &self.palette[index % self.palette.len()]
    }
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self::new(Vec::new(), 0.4, 2.0)
    }
}

/// Surface ids of one overlay's sub-boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayLayerIds {
    pub source: String,
    pub fill: String,
    pub outline: String,
}

impl OverlayLayerIds {
    fn for_index(index: usize) -> Self {
        let source = format!("nearby-{}", index);
        Self {
            fill: format!("{}-fill", source),
            outline: format!("{}-outline", source),
            source,
        }
    }
}

/// Surface handles owned for one nearby place.
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayRecord {
    pub place_id: String,
    pub name: String,
    pub marker: MarkerId,
    /// Present when the place carried a geometry.
    pub layers: Option<OverlayLayerIds>,
}

/// Owns the overlay set for the most recent nearby-places result.
#[derive(Debug, Default)]
pub struct OverlaySetManager {
    style: OverlayStyle,
    records: Vec<OverlayRecord>,
}

impl OverlaySetManager {
    pub fn new(style: OverlayStyle) -> Self {
        Self {
            style,
            records: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of overlay layers currently registered.
    pub fn live_layer_count(&self) -> usize {
        self.records.iter().filter(|r| r.layers.is_some()).count() * 2
    }

    /// Replaces the overlay set with one record per place.
    ///
    /// The previous set is torn down completely before the new one is built.
    pub fn replace<S>(&mut self, surface: &mut S, places: &[NearbyPlace]) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        self.clear(surface)?;

        for (index, place) in places.iter().enumerate() {
            let record = self.build(surface, index, place)?;
            self.records.push(record);
        }

        debug!(
            places = places.len(),
            layers = self.live_layer_count(),
            "Overlay set replaced"
        );
        Ok(())
    }

    fn build<S>(
        &self,
        surface: &mut S,
        index: usize,
        place: &NearbyPlace,
    ) -> Result<OverlayRecord, SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        let marker = surface.add_marker(MarkerSpec {
            position: place.position(),
            label: Some(place.name.clone()),
            role: MarkerRole::Place,
        });

        let layers = match &place.geometry {
            Some(geometry) => {
                let ids = OverlayLayerIds::for_index(index);
                let color = self.style.color_for(index);
                let feature = json!({
                    "type": "Feature",
                    "geometry": geometry,
                    "properties": { "id": place.id, "name": place.name },
                });

                let mut added = Added::default();
                if let Err(e) = self.add_sub_boundary(surface, &ids, color, feature, &mut added) {
                    added.rollback(surface, &ids);
                    let _ = surface.remove_marker(marker);
                    return Err(e);
                }
                Some(ids)
            }
            None => None,
        };

        Ok(OverlayRecord {
            place_id: place.id.clone(),
            name: place.name.clone(),
            marker,
            layers,
        })
    }

    fn add_sub_boundary<S>(
        &self,
        surface: &mut S,
        ids: &OverlayLayerIds,
        color: &str,
        feature: Value,
        added: &mut Added,
    ) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        surface.add_source(&ids.source, feature)?;
        added.source = true;
        surface.add_layer(
            LayerSpec::fill(&ids.fill, &ids.source)
                .with_paint(PaintProperty::FillColor, PaintValue::color(color))
                .with_paint(
                    PaintProperty::FillOpacity,
                    PaintValue::Number(self.style.fill_opacity),
                ),
        )?;
        added.fill = true;
        surface.add_layer(
            LayerSpec::line(&ids.outline, &ids.source)
                .with_paint(PaintProperty::LineColor, PaintValue::color(color))
                .with_paint(
                    PaintProperty::LineWidth,
                    PaintValue::Number(self.style.outline_width),
                ),
        )?;
        added.outline = true;
        Ok(())
    }

    /// Removes every overlay: markers first, then each record's layers and
    /// source.
    pub fn clear<S>(&mut self, surface: &mut S) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        for record in &self.records {
            tolerate_missing(surface.remove_marker(record.marker))?;
        }
        while let Some(record) = self.records.first() {
            if let Some(ids) = &record.layers {
                tolerate_missing(surface.remove_layer(&ids.fill))?;
                tolerate_missing(surface.remove_layer(&ids.outline))?;
                tolerate_missing(surface.remove_source(&ids.source))?;
            }
            self.records.remove(0);
        }
        Ok(())
    }
}

/// Which parts of one sub-boundary were registered.
#[derive(Debug, Default)]
struct Added {
    source: bool,
    fill: bool,
    outline: bool,
}

impl Added {
    fn rollback<S>(self, surface: &mut S, ids: &OverlayLayerIds)
    where
        S: RenderSurface + ?Sized,
    {
        if self.outline {
            let _ = surface.remove_layer(&ids.outline);
        }
        if self.fill {
            let _ = surface.remove_layer(&ids.fill);
        }
        if self.source {
            let _ = surface.remove_source(&ids.source);
        }
    }
}
