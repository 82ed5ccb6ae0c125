//! Boundary dataset layers.

use tracing::debug;

use super::tolerate_missing;
use crate::geo::LngLat;
use crate::model::{BoundaryDataset, BoundaryKind, FeatureHit};
use crate::surface::{
    LayerSpec, PaintProperty, PaintValue, PointerEventKind, RenderSurface, SubscriptionId,
    SurfaceError,
};

/// Feature property the highlight expression matches on.
pub const HIGHLIGHT_PROPERTY: &str = "GEOID";

/// Pointer events the fill layer subscribes to.
const FILL_EVENTS: [PointerEventKind; 4] = [
    PointerEventKind::Move,
    PointerEventKind::Enter,
    PointerEventKind::Leave,
    PointerEventKind::Click,
];

/// Paint applied to boundary layers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryStyle {
    pub fill_color: String,
    pub fill_opacity: f64,
    pub highlight_color: String,
    pub outline_color: String,
    pub outline_width: f64,
}

impl Default for BoundaryStyle {
    fn default() -> Self {
        Self {
            fill_color: "#888888".to_string(),
            fill_opacity: 0.5,
            highlight_color: "#ff8c00".to_string(),
            outline_color: "#000000".to_string(),
            outline_width: 2.0,
        }
    }
}

/// Surface ids derived from a boundary kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundaryLayerIds {
    pub source: String,
    pub fill: String,
    pub outline: String,
}

impl BoundaryLayerIds {
    pub fn for_kind(kind: BoundaryKind) -> Self {
        let source = format!("boundaries-{}", kind);
        Self {
            fill: format!("{}-fill", source),
            outline: format!("{}-outline", source),
            source,
        }
    }
}

#[derive(Debug)]
struct Installed {
    dataset: BoundaryDataset,
    ids: BoundaryLayerIds,
    subscriptions: Vec<SubscriptionId>,
}

/// Owns the displayed boundary dataset and its render layers.
///
/// At most one dataset is installed. Installing a new one tears the previous
/// one down first: subscriptions, then layers, then the source.
#[derive(Debug)]
pub struct BoundaryLayerManager {
    style: BoundaryStyle,
    installed: Option<Installed>,
    last_hovered: Option<String>,
}

impl BoundaryLayerManager {
    pub fn new(style: BoundaryStyle) -> Self {
        Self {
            style,
            installed: None,
            last_hovered: None,
        }
    }

    pub fn style(&self) -> &BoundaryStyle {
        &self.style
    }

    pub fn kind(&self) -> Option<BoundaryKind> {
        self.installed.as_ref().map(|i| i.dataset.kind())
    }

    pub fn dataset(&self) -> Option<&BoundaryDataset> {
        self.installed.as_ref().map(|i| &i.dataset)
    }

    pub fn ids(&self) -> Option<&BoundaryLayerIds> {
        self.installed.as_ref().map(|i| &i.ids)
    }

    pub fn is_installed(&self) -> bool {
        self.installed.is_some()
    }

    /// Returns true if `layer_id` is one of the installed dataset's layers.
    pub fn owns_layer(&self, layer_id: &str) -> bool {
        self.ids()
            .is_some_and(|ids| ids.fill == layer_id || ids.outline == layer_id)
    }

    /// Replaces whatever is installed with `dataset`.
    ///
    /// On failure the partially created layers are rolled back and nothing is
    /// installed.
    pub fn install<S>(&mut self, surface: &mut S, dataset: BoundaryDataset) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        self.teardown(surface)?;

        let ids = BoundaryLayerIds::for_kind(dataset.kind());
        let mut built = Built::default();

        if let Err(e) = self.build(surface, &dataset, &ids, &mut built) {
            built.rollback(surface, &ids);
            return Err(e);
        }

        debug!(
            kind = %dataset.kind(),
            features = dataset.len(),
            "Boundary dataset installed"
        );
        self.installed = Some(Installed {
            dataset,
            ids,
            subscriptions: built.subscriptions,
        });
        Ok(())
    }

    fn build<S>(
        &self,
        surface: &mut S,
        dataset: &BoundaryDataset,
        ids: &BoundaryLayerIds,
        built: &mut Built,
    ) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        surface.add_source(&ids.source, dataset.to_feature_collection())?;
        built.source = true;

        surface.add_layer(
            LayerSpec::fill(&ids.fill, &ids.source)
                .with_paint(
                    PaintProperty::FillColor,
                    PaintValue::color(&self.style.fill_color),
                )
                .with_paint(
                    PaintProperty::FillOpacity,
                    PaintValue::Number(self.style.fill_opacity),
                ),
        )?;
        built.fill = true;

        surface.add_layer(
            LayerSpec::line(&ids.outline, &ids.source)
                .with_paint(
                    PaintProperty::LineColor,
                    PaintValue::color(&self.style.outline_color),
                )
                .with_paint(
                    PaintProperty::LineWidth,
                    PaintValue::Number(self.style.outline_width),
                ),
        )?;
        built.outline = true;

        for event in FILL_EVENTS {
            built
                .subscriptions
                .push(surface.subscribe(event, Some(&ids.fill))?);
        }
        Ok(())
    }

    /// Removes the installed dataset, if any.
    pub fn teardown<S>(&mut self, surface: &mut S) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        self.last_hovered = None;
        let Some(installed) = self.installed.take() else {
            return Ok(());
        };

        for id in &installed.subscriptions {
            surface.unsubscribe(*id);
        }
        let removed = tolerate_missing(surface.remove_layer(&installed.ids.outline))
            .and_then(|_| tolerate_missing(surface.remove_layer(&installed.ids.fill)))
            .and_then(|_| tolerate_missing(surface.remove_source(&installed.ids.source)));

        if let Err(e) = removed {
            // Keep ownership so a later teardown can retry.
            self.installed = Some(Installed {
                subscriptions: Vec::new(),
                ..installed
            });
            return Err(e);
        }

        debug!(kind = %installed.dataset.kind(), "Boundary dataset removed");
        Ok(())
    }

    /// Records the hovered feature name.
    ///
    /// Returns true only when the name differs from the last one recorded.
    pub fn track_hover(&mut self, name: Option<&str>) -> bool {
        if self.last_hovered.as_deref() == name {
            return false;
        }
        self.last_hovered = name.map(str::to_string);
        true
    }

    /// Colors the feature with `geo_id` distinctly from the rest.
    ///
    /// Returns false when no dataset is installed or `geo_id` is blank.
    pub fn highlight<S>(&self, surface: &mut S, geo_id: &str) -> Result<bool, SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        let Some(ids) = self.ids() else {
            return Ok(false);
        };
        if geo_id.trim().is_empty() {
            return Ok(false);
        }
        surface.set_paint_property(
            &ids.fill,
            PaintProperty::FillColor,
            PaintValue::MatchFeature {
                property: HIGHLIGHT_PROPERTY.to_string(),
                value: geo_id.to_string(),
                matched: self.style.highlight_color.clone(),
                fallback: self.style.fill_color.clone(),
            },
        )?;
        Ok(true)
    }

    /// Restores the default fill color.
    pub fn reset_fill<S>(&self, surface: &mut S) -> Result<bool, SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        let Some(ids) = self.ids() else {
            return Ok(false);
        };
        surface.set_paint_property(
            &ids.fill,
            PaintProperty::FillColor,
            PaintValue::color(&self.style.fill_color),
        )?;
        Ok(true)
    }

    /// Feature of the installed dataset under `point`.
    pub fn feature_at(&self, point: LngLat) -> Option<FeatureHit> {
        self.dataset()?.feature_at(point).map(|f| f.hit())
    }

    /// Popup text for `hit`, drawn from the installed feature's properties.
    ///
    /// Falls back to the hit's name when the feature is not installed.
    pub fn describe(&self, hit: &FeatureHit) -> String {
        hit.id
            .as_deref()
            .and_then(|id| self.dataset()?.find_by_id(id))
            .map(|feature| feature.summary())
            .unwrap_or_else(|| hit.name.clone())
    }
}

impl Default for BoundaryLayerManager {
    fn default() -> Self {
        Self::new(BoundaryStyle::default())
    }
}

/// What an install created so far.
#[derive(Debug, Default)]
struct Built {
    source: bool,
    fill: bool,
    outline: bool,
    subscriptions: Vec<SubscriptionId>,
}

impl Built {
    fn rollback<S>(self, surface: &mut S, ids: &BoundaryLayerIds)
    where
        S: RenderSurface + ?Sized,
    {
        for id in self.subscriptions {
            surface.unsubscribe(id);
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GeoFeature;
    use crate::surface::{RecordingSurface, SurfaceOp};
    use serde_json::json;

    fn square(name: &str, geo_id: &str, x: f64) -> GeoFeature {
        GeoFeature {
            id: geo_id.to_string(),
            name: name.to_string(),
            geo_identifier: geo_id.to_string(),
            geometry: json!({
                "type": "Polygon",
                "coordinates": [[[x, 0.0], [x + 1.0, 0.0], [x + 1.0, 1.0], [x, 1.0], [x, 0.0]]]
            }),
            properties: Default::default(),
        }
    }

    fn dataset(kind: BoundaryKind) -> BoundaryDataset {
        BoundaryDataset::new(
            kind,
            vec![square("West", "01", 0.0), square("East", "02", 1.0)],
        )
    }

    #[test]
    fn test_install_registers_source_layers_and_subscriptions() {
        let mut surface = RecordingSurface::new();
        let mut manager = BoundaryLayerManager::default();

        manager
            .install(&mut surface, dataset(BoundaryKind::States))
            .unwrap();

        assert_eq!(surface.source_ids(), vec!["boundaries-states"]);
        assert_eq!(
            surface.layer_ids(),
            vec!["boundaries-states-fill", "boundaries-states-outline"]
        );
        assert_eq!(surface.subscriptions().len(), 4);
        assert!(surface
            .subscriptions()
            .iter()
            .all(|(_, layer)| *layer == Some("boundaries-states-fill")));
        assert_eq!(manager.kind(), Some(BoundaryKind::States));
    }

    #[test]
    fn test_swap_tears_down_layers_before_source() {
        let mut surface = RecordingSurface::new();
        let mut manager = BoundaryLayerManager::default();
        manager
            .install(&mut surface, dataset(BoundaryKind::States))
            .unwrap();
        surface.clear_journal();

        manager
            .install(&mut surface, dataset(BoundaryKind::Counties))
            .unwrap();

        let journal = surface.journal();
        let layer_removed = journal
            .iter()
            .position(|op| *op == SurfaceOp::RemoveLayer("boundaries-states-fill".to_string()))
            .unwrap();
        let source_removed = journal
            .iter()
            .position(|op| *op == SurfaceOp::RemoveSource("boundaries-states".to_string()))
            .unwrap();
        assert!(layer_removed < source_removed);

        assert_eq!(surface.source_ids(), vec!["boundaries-counties"]);
        assert_eq!(surface.layer_ids().len(), 2);
        assert_eq!(surface.subscriptions().len(), 4);
    }

    #[test]
    fn test_reinstalling_same_kind_does_not_duplicate() {
        let mut surface = RecordingSurface::new();
        let mut manager = BoundaryLayerManager::default();
        manager
            .install(&mut surface, dataset(BoundaryKind::Counties))
            .unwrap();
        manager
            .install(&mut surface, dataset(BoundaryKind::Counties))
            .unwrap();

        assert_eq!(surface.source_ids(), vec!["boundaries-counties"]);
        assert_eq!(surface.layer_ids().len(), 2);
    }

    #[test]
    fn test_failed_install_rolls_back() {
        let mut surface = RecordingSurface::new();
        // Occupy the outline id so the second add_layer fails.
        surface.add_source("other", json!({})).unwrap();
        surface
            .add_layer(LayerSpec::line("boundaries-regions-outline", "other"))
            .unwrap();

        let mut manager = BoundaryLayerManager::default();
        let result = manager.install(&mut surface, dataset(BoundaryKind::Regions));

        assert!(matches!(result, Err(SurfaceError::DuplicateLayer(_))));
        assert!(!manager.is_installed());
        assert!(!surface.has_source("boundaries-regions"));
        assert!(!surface.has_layer("boundaries-regions-fill"));
        assert!(surface.has_layer("boundaries-regions-outline"));
    }

    #[test]
    fn test_highlight_and_reset() {
        let mut surface = RecordingSurface::new();
        let mut manager = BoundaryLayerManager::default();
        assert_eq!(manager.highlight(&mut surface, "01"), Ok(false));

        manager
            .install(&mut surface, dataset(BoundaryKind::States))
            .unwrap();
        assert_eq!(manager.highlight(&mut surface, "02"), Ok(true));

        let paint = surface
            .paint("boundaries-states-fill", PaintProperty::FillColor)
            .unwrap();
        assert_eq!(paint.resolve_color(Some("02")), Some("#ff8c00"));
        assert_eq!(paint.resolve_color(Some("01")), Some("#888888"));

        manager.reset_fill(&mut surface).unwrap();
        assert_eq!(
            surface.paint("boundaries-states-fill", PaintProperty::FillColor),
            Some(&PaintValue::color("#888888"))
        );
    }

    #[test]
    fn test_blank_identifier_is_not_highlighted() {
        let mut surface = RecordingSurface::new();
        let mut manager = BoundaryLayerManager::default();
        manager
            .install(&mut surface, dataset(BoundaryKind::States))
            .unwrap();

        assert_eq!(manager.highlight(&mut surface, ""), Ok(false));
        assert_eq!(
            surface.paint("boundaries-states-fill", PaintProperty::FillColor),
            Some(&PaintValue::color("#888888"))
        );
    }

    #[test]
    fn test_describe_uses_installed_feature() {
        let mut surface = RecordingSurface::new();
        let mut manager = BoundaryLayerManager::default();
        manager
            .install(&mut surface, dataset(BoundaryKind::States))
            .unwrap();

        let hit = manager.feature_at(LngLat::new(1.5, 0.5)).unwrap();
        assert_eq!(manager.describe(&hit), "East\nGEOID: 02");

        let foreign = FeatureHit {
            id: Some("99".to_string()),
            name: "Elsewhere".to_string(),
            geo_identifier: String::new(),
        };
        assert_eq!(manager.describe(&foreign), "Elsewhere");
    }

    #[test]
    fn test_track_hover_deduplicates() {
        let mut manager = BoundaryLayerManager::default();
        assert!(manager.track_hover(Some("West")));
        assert!(!manager.track_hover(Some("West")));
        assert!(manager.track_hover(Some("East")));
        assert!(manager.track_hover(None));
        assert!(!manager.track_hover(None));
    }

    #[test]
    fn test_feature_at_resolves_installed_dataset() {
        let mut surface = RecordingSurface::new();
        let mut manager = BoundaryLayerManager::default();
        assert_eq!(manager.feature_at(LngLat::new(0.5, 0.5)), None);

        manager
            .install(&mut surface, dataset(BoundaryKind::States))
            .unwrap();
        let hit = manager.feature_at(LngLat::new(1.5, 0.5)).unwrap();
        assert_eq!(hit.name, "East");
        assert!(manager.owns_layer("boundaries-states-fill"));
        assert!(!manager.owns_layer("nearby-0-fill"));
    }

    #[test]
    fn test_teardown_clears_everything() {
        let mut surface = RecordingSurface::new();
        let mut manager = BoundaryLayerManager::default();
        manager
            .install(&mut surface, dataset(BoundaryKind::States))
            .unwrap();

        manager.teardown(&mut surface).unwrap();
        assert!(surface.source_ids().is_empty());
        assert!(surface.layer_ids().is_empty());
        assert!(surface.subscriptions().is_empty());
        assert_eq!(manager.kind(), None);
    }
}
