//! Autocomplete suggestion type.

use serde::Serialize;
use serde_json::Value;

/// One autocomplete suggestion for the boundary search box.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub name: String,
    pub geo_id: String,
    pub geometry: Option<Value>,
}

impl SearchHit {
    pub fn new(name: impl Into<String>, geo_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geo_id: geo_id.into(),
            geometry: None,
        }
    }
}
