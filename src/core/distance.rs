use crate::models::Coordinate;

/// Equatorial Earth radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6378.137;

/// Great-circle distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// Inputs are not range checked: out-of-range degrees still give a defined
/// (if meaningless) result. NaN or infinite input yields NaN.
#[inline]
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = lat1_rad - lat2_rad;
    let delta_lon = lon1.to_radians() - lon2.to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);

    // Rounding can push h a hair above 1 for antipodal points.
    // f64::min would swallow NaN here, so compare explicitly.
    let root = h.sqrt();
    let root = if root > 1.0 { 1.0 } else { root };

    2.0 * root.asin() * EARTH_RADIUS_KM
}

impl Coordinate {
    /// Distance to `other` in kilometers
    #[inline]
    pub fn distance_to(&self, other: &Coordinate) -> f64 {
        distance(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(value: Coordinate) -> Self {
        geo::Point::new(value.longitude, value.latitude)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(value: geo::Point<f64>) -> Self {
        Coordinate::new(value.y(), value.x())
    }
}
