//! NearestGymsService - picks the gyms to feature for a home location.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::domain::geo::{rank_by_distance, Coordinate};
use crate::domain::gym::{Gym, GymFilter};
use crate::ports::GymRepository;

/// A gym with its distance from the origin, when one was known.
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyGym {
    pub gym: Gym,
    pub distance_km: Option<f64>,
}

pub struct NearestGymsService {
    gyms: Arc<dyn GymRepository>,
}

impl NearestGymsService {
    pub fn new(gyms: Arc<dyn GymRepository>) -> Self {
        Self { gyms }
    }

    /// Up to `count` active gyms nearest to `origin`.
    ///
    /// Without an origin, or when no active gym has coordinates, the first
    /// `count` active gyms by id are returned without distances.
    pub async fn nearest(
        &self,
        origin: Option<Coordinate>,
        count: usize,
    ) -> Result<Vec<NearbyGym>, DomainError> {
        if let Some(origin) = origin {
            let located = self
                .gyms
                .search(&GymFilter::new().active().geolocated())
                .await?;
            let ranked: Vec<NearbyGym> = rank_by_distance(origin, located, |g| g.coordinate)
                .into_iter()
                .take(count)
                .map(|r| NearbyGym {
                    gym: r.item,
                    distance_km: Some(r.distance_km),
                })
                .collect();
            if !ranked.is_empty() {
                return Ok(ranked);
            }
        }

        let fallback = self
            .gyms
            .search(&GymFilter::new().active().limit(count as i64))
            .await?;
        Ok(fallback
            .into_iter()
            .map(|gym| NearbyGym {
                gym,
                distance_km: None,
            })
            .collect())
    }
}
