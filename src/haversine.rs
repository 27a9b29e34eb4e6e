//! Haversine road-distance model.
//!
//! Uses great-circle distance scaled by a fixed road factor to estimate
//! driving distance. Ignores the actual road network but is always
//! available and symmetric.

use crate::model::Coordinates;
use crate::traits::DistanceModel;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Straight-line to road distance multiplier.
pub const DEFAULT_ROAD_FACTOR: f64 = 1.35;

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` a hair above 1 for antipodal points.
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * c
}

/// Haversine distance times a road factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoadDistance {
    pub road_factor: f64,
}

impl Default for RoadDistance {
    fn default() -> Self {
        Self {
            road_factor: DEFAULT_ROAD_FACTOR,
        }
    }
}

impl RoadDistance {
    pub fn new(road_factor: f64) -> Self {
        Self { road_factor }
    }
}

impl DistanceModel for RoadDistance {
    fn distance_km(&self, from: Coordinates, to: Coordinates) -> f64 {
        haversine_km(from, to) * self.road_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64) -> Coordinates {
        Coordinates::new(lat, lon)
    }

    #[test]
    fn test_haversine_same_point() {
        let dist = haversine_km(at(40.195, 29.06), at(40.195, 29.06));
        assert!(dist < 0.001, "Same point should have ~0 distance");
    }

    #[test]
    fn test_haversine_known_distance() {
        // Bursa (40.18, 29.07) to Istanbul (41.01, 28.98), ~93 km as the crow flies
        let dist = haversine_km(at(40.18, 29.07), at(41.01, 28.98));
        assert!(dist > 85.0 && dist < 100.0, "Bursa to Istanbul should be ~93km, got {}", dist);
    }

    #[test]
    fn test_one_degree_latitude_with_road_factor() {
        let model = RoadDistance::default();
        let dist = model.distance_km(at(40.0, 29.0), at(41.0, 29.0));
        let expected = 111.19 * 1.35;
        assert!(
            (dist - expected).abs() / expected < 0.01,
            "1° latitude should be ~{:.1}km road distance, got {:.1}",
            expected,
            dist
        );
    }

    #[test]
    fn test_road_factor_scales_linearly() {
        let a = at(40.1950, 29.0600);
        let b = at(40.2131, 29.0374);
        let plain = RoadDistance::new(1.0).distance_km(a, b);
        let road = RoadDistance::new(1.35).distance_km(a, b);
        assert!((road - plain * 1.35).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_points_do_not_nan() {
        let dist = haversine_km(at(0.0, 0.0), at(0.0, 180.0));
        assert!(dist.is_finite());
        assert!((dist - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1.0);
    }

    #[test]
    fn test_matrix_diagonal_is_zero() {
        let model = RoadDistance::default();
        let locations = vec![at(40.19, 29.06), at(40.20, 29.07), at(40.21, 29.03)];
        let matrix = model.matrix_for(&locations);

        for i in 0..locations.len() {
            assert_eq!(matrix[i][i], 0.0, "Diagonal should be zero");
        }
    }

    #[test]
    fn test_matrix_symmetric() {
        let model = RoadDistance::default();
        let locations = vec![at(40.19, 29.06), at(40.21, 29.03)];
        let matrix = model.matrix_for(&locations);

        assert_eq!(matrix[0][1], matrix[1][0], "Matrix should be symmetric");
    }
}
