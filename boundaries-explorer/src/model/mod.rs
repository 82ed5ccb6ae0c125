//! Domain data model
//!
//! Plain data types shared by the controller, the layer managers, the backend
//! and the sidebar. Wire decoding lives in [`crate::backend`]; these types
//! carry no transport concerns.
//!
//! - [`BoundaryDataset`] / [`GeoFeature`] - the active boundary collection
//! - [`SelectionPoint`] / [`SearchRadius`] - click location and search radius
//! - [`NearbyPlace`] - one nearby-places result
//! - [`DemographicRecord`] / [`DemographicYear`] - demographics per selection
//! - [`SearchHit`] - one autocomplete suggestion

mod boundary;
mod demographics;
mod place;
mod search;

pub use boundary::{
    BoundaryDataset, BoundaryKind, DatasetError, FeatureHit, GeoFeature, ParseBoundaryKindError,
};
pub use demographics::{DemographicRecord, DemographicYear, EntityKind};
pub use place::{NearbyPlace, SearchRadius, SelectionPoint};
pub use search::SearchHit;
