use crate::database::models::GeoFence;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in metres (haversine)
pub fn distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

impl GeoFence {
    pub fn distance_to(&self, latitude: f64, longitude: f64) -> f64 {
        distance_m(self.latitude, self.longitude, latitude, longitude)
    }

    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        self.distance_to(latitude, longitude) <= self.radius_m
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_point_is_zero() {
        assert!(distance_m(41.31, 69.28, 41.31, 69.28).abs() < 1e-6);
    }

    #[test]
    fn one_degree_of_latitude_is_about_111_km() {
        let d = distance_m(41.0, 69.0, 42.0, 69.0);
        assert!((d - 111_195.0).abs() < 100.0, "got {}", d);
    }

    #[test]
    fn fence_contains_nearby_points_only() {
        let fence = GeoFence::new(41.3111, 69.2797, 200.0).unwrap();
        assert!(fence.contains(41.3120, 69.2797));
        assert!(!fence.contains(41.3200, 69.2797));
    }
}
