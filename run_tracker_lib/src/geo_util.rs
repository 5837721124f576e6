use crate::position::Position;

/// Mean earth radius in km.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two positions, in meters.
///
/// The intermediate term is clamped to `[0, 1]`, so near-duplicate points give
/// a value close to zero and antipodal points give half the circumference,
/// never NaN.
pub fn haversine_distance(a: &Position, b: &Position) -> f64 {
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();
    let lat_a = a.latitude.to_radians();
    let lat_b = b.latitude.to_radians();

    let h = f64::sin(d_lat / 2.).powi(2)
        + f64::cos(lat_a) * f64::cos(lat_b) * f64::sin(d_lon / 2.).powi(2);
    let h = h.clamp(0., 1.);

    let c = 2. * f64::atan2(h.sqrt(), (1. - h).sqrt());

    EARTH_RADIUS_KM * c * 1000.
}

/// Sum of the distances between consecutive positions, in meters.
pub fn path_length(path: &[Position]) -> f64 {
    path.windows(2)
        .map(|pair| haversine_distance(&pair[0], &pair[1]))
        .sum()
}
