//! Lookup-table geocoder.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::geo::Coordinate;
use crate::ports::Geocoder;

/// Resolves only the postal codes it was given; everything else is `None`.
#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    known: HashMap<String, Coordinate>,
}

impl StaticGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, postal_code: impl Into<String>, coordinate: Coordinate) -> Self {
        self.known.insert(postal_code.into(), coordinate);
        self
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, postal_code: &str) -> Option<Coordinate> {
        self.known.get(postal_code.trim()).copied()
    }
}
