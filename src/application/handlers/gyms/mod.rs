//! Gym lookup services.

mod nearest_gyms;

pub use nearest_gyms::{NearbyGym, NearestGymsService};
