//! Layer lifecycle on the rendering surface.
//!
//! Three owners mutate the surface registry:
//!
//! - [`BoundaryLayerManager`] installs the single active boundary dataset as
//!   one source with a fill and an outline layer, and swaps it wholesale.
//! - [`OverlaySetManager`] owns the markers and sub-boundary layers for the
//!   current nearby-places result.
//! - [`RadiusOverlay`] draws the search-radius circle.
//!
//! Each tears its layers down before their source.

mod boundary;
mod overlay;
mod radius;

pub use boundary::{BoundaryLayerIds, BoundaryLayerManager, BoundaryStyle, HIGHLIGHT_PROPERTY};
pub use overlay::{OverlayLayerIds, DEFAULT_PALETTE, OverlayRecord, OverlaySetManager, OverlayStyle};
pub use radius::{RadiusCircle, RadiusOverlay, RadiusStyle, RADIUS_SOURCE_ID};

use crate::surface::SurfaceError;

/// Treats "already gone" as success during teardown.
fn tolerate_missing(result: Result<(), SurfaceError>) -> Result<(), SurfaceError> {
    match result {
        Err(SurfaceError::UnknownLayer(_))
        | Err(SurfaceError::UnknownSource(_))
        | Err(SurfaceError::UnknownMarker(_)) => Ok(()),
        other => other,
    }
}
