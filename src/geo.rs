//! Great-circle distance on a spherical earth

use serde::{Deserialize, Serialize};

/// Mean earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// A position in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Distance to another point in kilometers
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(*self, *other)
    }
}

/// Haversine distance between two points in kilometers.
///
/// Inputs are expected within [-90, 90] latitude and [-180, 180] longitude;
/// they are not validated here.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h slightly outside [0, 1] for antipodal points
    let h = h.clamp(0.0, 1.0);

    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// Arithmetic mean of a set of positions, `None` when empty
pub fn mean_position<I>(points: I) -> Option<GeoPoint>
where
    I: IntoIterator<Item = GeoPoint>,
{
    let mut count = 0usize;
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;

    for p in points {
        lat_sum += p.latitude;
        lon_sum += p.longitude;
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(GeoPoint::new(lat_sum / count as f64, lon_sum / count as f64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_distance_to_self() {
        let p = GeoPoint::new(-23.55, -46.63);
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = GeoPoint::new(-22.9, -47.06);
        let b = GeoPoint::new(-21.17, -47.81);
        assert_eq!(haversine_km(a, b), haversine_km(b, a));
    }

    #[test]
    fn known_city_pair() {
        // Sao Paulo to Rio de Janeiro
        let sp = GeoPoint::new(-23.5505, -46.6333);
        let rio = GeoPoint::new(-22.9068, -43.1729);
        assert_abs_diff_eq!(haversine_km(sp, rio), 360.7493, epsilon = 1e-3);
    }

    #[test]
    fn one_degree_of_longitude_on_equator() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 1.0);
        let expected = EARTH_RADIUS_KM * 1.0f64.to_radians();
        assert_abs_diff_eq!(haversine_km(a, b), expected, epsilon = 1e-3);
    }

    #[test]
    fn antipodal_points_do_not_produce_nan() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        let d = haversine_km(a, b);
        assert!(d.is_finite());
        assert_abs_diff_eq!(d, std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 1e-3);
    }

    #[test]
    fn mean_of_points() {
        let m = mean_position(vec![GeoPoint::new(0.0, 0.0), GeoPoint::new(2.0, 4.0)]).unwrap();
        assert_eq!(m, GeoPoint::new(1.0, 2.0));
        assert!(mean_position(Vec::new()).is_none());
    }
}
