//! Demographic records returned for a selection.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Which administrative level a demographic record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    State,
    County,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::State => write!(f, "state"),
            EntityKind::County => write!(f, "county"),
        }
    }
}

/// Census figures for one year. Absent figures are `None`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DemographicYear {
    pub year: u16,
    pub total_population: Option<u64>,
    pub female_population: Option<u64>,
    pub median_gross_rent: Option<f64>,
    pub median_household_income: Option<f64>,
    pub male_bachelors_25_plus: Option<u64>,
    pub female_bachelors_25_plus: Option<u64>,
}

impl DemographicYear {
    pub fn new(year: u16) -> Self {
        Self {
            year,
            ..Default::default()
        }
    }
}

/// Demographics for the selected entity, keyed by year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemographicRecord {
    pub entity_kind: EntityKind,
    pub name: String,
    year_series: BTreeMap<u16, DemographicYear>,
}

impl DemographicRecord {
    /// Builds a record. A repeated year keeps the last entry.
    pub fn new(
        entity_kind: EntityKind,
        name: impl Into<String>,
        years: impl IntoIterator<Item = DemographicYear>,
    ) -> Self {
        Self {
            entity_kind,
            name: name.into(),
            year_series: years.into_iter().map(|y| (y.year, y)).collect(),
        }
    }

    /// Figures for `year`, if present.
    pub fn year(&self, year: u16) -> Option<&DemographicYear> {
        self.year_series.get(&year)
    }

    /// Available years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = u16> + '_ {
        self.year_series.keys().copied()
    }

    /// Most recent year present.
    pub fn latest_year(&self) -> Option<u16> {
        self.year_series.keys().next_back().copied()
    }

    /// Inclusive `(earliest, latest)` year range.
    pub fn year_range(&self) -> Option<(u16, u16)> {
        let first = *self.year_series.keys().next()?;
        let last = *self.year_series.keys().next_back()?;
        Some((first, last))
    }

    pub fn contains_year(&self, year: u16) -> bool {
        self.year_series.contains_key(&year)
    }

    pub fn is_empty(&self) -> bool {
        self.year_series.is_empty()
    }
}
