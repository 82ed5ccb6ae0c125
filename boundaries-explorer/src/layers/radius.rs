//! Search-radius circle overlay.

use super::tolerate_missing;
use crate::geo::{ClosedPolygon, LngLat};
use crate::surface::{LayerSpec, PaintProperty, PaintValue, RenderSurface, SurfaceError};

/// Source id of the radius circle.
pub const RADIUS_SOURCE_ID: &str = "search-radius";
const RADIUS_FILL_ID: &str = "search-radius-fill";
const RADIUS_OUTLINE_ID: &str = "search-radius-outline";

/// Paint applied to the radius circle.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusStyle {
    pub fill_color: String,
    pub fill_opacity: f64,
    pub outline_width: f64,
}

impl Default for RadiusStyle {
    fn default() -> Self {
        Self {
            fill_color: "#1e90ff".to_string(),
            fill_opacity: 0.15,
            outline_width: 1.0,
        }
    }
}

/// The circle currently drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct RadiusCircle {
    pub center: LngLat,
    pub radius_km: f64,
    pub polygon: ClosedPolygon,
}

/// Draws at most one search-radius circle.
#[derive(Debug, Default)]
pub struct RadiusOverlay {
    style: RadiusStyle,
    current: Option<RadiusCircle>,
}

impl RadiusOverlay {
    pub fn new(style: RadiusStyle) -> Self {
        Self {
            style,
            current: None,
        }
    }

    pub fn current(&self) -> Option<&RadiusCircle> {
        self.current.as_ref()
    }

    /// Draws `circle`, replacing any previous one.
    pub fn show<S>(&mut self, surface: &mut S, circle: RadiusCircle) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        self.clear(surface)?;

        surface.add_source(RADIUS_SOURCE_ID, circle.polygon.to_feature())?;
        let layers = surface
            .add_layer(
                LayerSpec::fill(RADIUS_FILL_ID, RADIUS_SOURCE_ID)
                    .with_paint(
                        PaintProperty::FillColor,
                        PaintValue::color(&self.style.fill_color),
                    )
                    .with_paint(
                        PaintProperty::FillOpacity,
                        PaintValue::Number(self.style.fill_opacity),
                    ),
            )
            .and_then(|_| {
                surface.add_layer(
                    LayerSpec::line(RADIUS_OUTLINE_ID, RADIUS_SOURCE_ID)
                        .with_paint(
                            PaintProperty::LineColor,
                            PaintValue::color(&self.style.fill_color),
                        )
                        .with_paint(
                            PaintProperty::LineWidth,
                            PaintValue::Number(self.style.outline_width),
                        ),
                )
            });

        if let Err(e) = layers {
            let _ = surface.remove_layer(RADIUS_FILL_ID);
            let _ = surface.remove_source(RADIUS_SOURCE_ID);
            return Err(e);
        }

        self.current = Some(circle);
        Ok(())
    }

    /// Removes the circle, if drawn.
    pub fn clear<S>(&mut self, surface: &mut S) -> Result<(), SurfaceError>
    where
        S: RenderSurface + ?Sized,
    {
        if self.current.take().is_none() {
            return Ok(());
        }
        tolerate_missing(surface.remove_layer(RADIUS_OUTLINE_ID))?;
        tolerate_missing(surface.remove_layer(RADIUS_FILL_ID))?;
        tolerate_missing(surface.remove_source(RADIUS_SOURCE_ID))
    }
}
