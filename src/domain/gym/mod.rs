//! Gym module - read-only catalog entries and the filter used to select them.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::GymId;
use crate::domain::geo::Coordinate;

/// A partner gym location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gym {
    pub id: GymId,
    pub name: String,
    pub address: String,
    pub city: Option<String>,
    pub postal_code: Option<String>,
    pub chain: Option<String>,
    pub coordinate: Option<Coordinate>,
    pub is_active: bool,
}

impl Gym {
    /// One-line address for templates.
    pub fn display_address(&self) -> String {
        match (&self.city, &self.postal_code) {
            (Some(city), Some(zip)) => format!("{}, {} {}", self.address, city, zip),
            (Some(city), None) => format!("{}, {}", self.address, city),
            (None, Some(zip)) => format!("{} {}", self.address, zip),
            (None, None) => self.address.clone(),
        }
    }
}

/// Conjunction of optional predicates over the gym catalog.
///
/// Every predicate left as `None` (or `false`) is not applied. Results are
/// ordered by id so the same filter always yields the same rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GymFilter {
    pub active: Option<bool>,
    pub geolocated: bool,
    pub chain: Option<String>,
    pub postal_code: Option<String>,
    pub ids: Option<Vec<GymId>>,
    pub limit: Option<i64>,
}

impl GymFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(mut self) -> Self {
        self.active = Some(true);
        self
    }

    pub fn geolocated(mut self) -> Self {
        self.geolocated = true;
        self
    }

    pub fn chain(mut self, chain: impl Into<String>) -> Self {
        self.chain = Some(chain.into());
        self
    }

    pub fn postal_code(mut self, postal_code: impl Into<String>) -> Self {
        self.postal_code = Some(postal_code.into());
        self
    }

    pub fn ids(mut self, ids: Vec<GymId>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Evaluates the predicates against one gym.
    ///
    /// Storage adapters that cannot push the filter down use this directly.
    pub fn matches(&self, gym: &Gym) -> bool {
        if let Some(active) = self.active {
            if gym.is_active != active {
                return false;
            }
        }
        if self.geolocated && gym.coordinate.is_none() {
            return false;
        }
        if let Some(chain) = &self.chain {
            if gym.chain.as_deref() != Some(chain.as_str()) {
                return false;
            }
        }
        if let Some(zip) = &self.postal_code {
            if gym.postal_code.as_deref() != Some(zip.as_str()) {
                return false;
            }
        }
        if let Some(ids) = &self.ids {
            if !ids.contains(&gym.id) {
                return false;
            }
        }
        true
    }
}
