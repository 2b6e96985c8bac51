//! Geo ranking - great-circle distance and nearest-first ordering.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a coordinate only when both parts are present and finite.
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        match (latitude, longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Self::new(lat, lon))
            }
            _ => None,
        }
    }
}

/// Haversine distance between two points, in kilometres.
pub fn haversine_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Rounding can push h a hair above 1 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}

/// An item paired with its distance from the ranking origin.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranked<T> {
    pub item: T,
    pub distance_km: f64,
}

/// Orders `points` nearest first from `origin`.
///
/// Items without a coordinate are dropped. Equal distances keep their input
/// order.
pub fn rank_by_distance<T, F>(origin: Coordinate, points: Vec<T>, coordinate_of: F) -> Vec<Ranked<T>>
where
    F: Fn(&T) -> Option<Coordinate>,
{
    let mut ranked: Vec<Ranked<T>> = points
        .into_iter()
        .filter_map(|item| {
            let coord = coordinate_of(&item)?;
            Some(Ranked {
                distance_km: haversine_km(origin, coord),
                item,
            })
        })
        .collect();

    // sort_by is stable
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NYC: Coordinate = Coordinate {
        latitude: 40.7128,
        longitude: -74.0060,
    };
    const BOSTON: Coordinate = Coordinate {
        latitude: 42.3601,
        longitude: -71.0589,
    };
    const PHILLY: Coordinate = Coordinate {
        latitude: 39.9526,
        longitude: -75.1652,
    };
    const LA: Coordinate = Coordinate {
        latitude: 34.0522,
        longitude: -118.2437,
    };

    // ══════════════════════════════════════════════════════════════
    // Haversine
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_km(NYC, NYC), 0.0);
    }

    #[test]
    fn nyc_to_la_is_about_3936_km() {
        let d = haversine_km(NYC, LA);
        assert!((d - 3936.0).abs() < 5.0, "got {}", d);
    }

    #[test]
    fn quarter_meridian_matches_radius() {
        let equator = Coordinate::new(0.0, 0.0);
        let pole = Coordinate::new(90.0, 0.0);
        let expected = EARTH_RADIUS_KM * std::f64::consts::FRAC_PI_2;
        assert!((haversine_km(equator, pole) - expected).abs() < 1e-6);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let d = haversine_km(Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 180.0));
        assert!(d.is_finite());
        assert!((d - EARTH_RADIUS_KM * std::f64::consts::PI).abs() < 1e-6);
    }

    #[test]
    fn from_parts_requires_both_values() {
        assert!(Coordinate::from_parts(Some(1.0), None).is_none());
        assert!(Coordinate::from_parts(None, Some(1.0)).is_none());
        assert!(Coordinate::from_parts(Some(f64::NAN), Some(1.0)).is_none());
        assert_eq!(
            Coordinate::from_parts(Some(1.0), Some(2.0)),
            Some(Coordinate::new(1.0, 2.0))
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Ranking
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn ranks_three_cities_nearest_first() {
        let points = vec![("la", LA), ("boston", BOSTON), ("philly", PHILLY)];

        let ranked = rank_by_distance(NYC, points, |(_, c)| Some(*c));

        let names: Vec<&str> = ranked.iter().map(|r| r.item.0).collect();
        assert_eq!(names, vec!["philly", "boston", "la"]);
        assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
    }

    #[test]
    fn ties_keep_input_order() {
        let points = vec![("first", BOSTON), ("second", BOSTON), ("third", BOSTON)];

        let ranked = rank_by_distance(NYC, points, |(_, c)| Some(*c));

        let names: Vec<&str> = ranked.iter().map(|r| r.item.0).collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn points_without_coordinates_are_dropped() {
        let points = vec![("known", Some(BOSTON)), ("unknown", None)];

        let ranked = rank_by_distance(NYC, points, |(_, c)| *c);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].item.0, "known");
    }

    fn coordinate() -> impl Strategy<Value = Coordinate> {
        (-90.0f64..=90.0, -180.0f64..=180.0).prop_map(|(lat, lon)| Coordinate::new(lat, lon))
    }

    proptest! {
        #[test]
        fn distance_is_symmetric(a in coordinate(), b in coordinate()) {
            let ab = haversine_km(a, b);
            let ba = haversine_km(b, a);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn distance_from_point_to_itself_is_zero(a in coordinate()) {
            prop_assert!(haversine_km(a, a).abs() < 1e-9);
        }

        #[test]
        fn distance_is_bounded_by_half_circumference(a in coordinate(), b in coordinate()) {
            let d = haversine_km(a, b);
            prop_assert!(d >= 0.0);
            prop_assert!(d <= EARTH_RADIUS_KM * std::f64::consts::PI + 1e-6);
        }

        #[test]
        fn ranking_is_sorted(origin in coordinate(), points in prop::collection::vec(coordinate(), 0..20)) {
            let ranked = rank_by_distance(origin, points, |c| Some(*c));
            prop_assert!(ranked.windows(2).all(|w| w[0].distance_km <= w[1].distance_km));
        }
    }
}
