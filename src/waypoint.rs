/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A location given as longitude and latitude in degrees and depth below
/// the surface in kilometers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lon: f64,
    pub lat: f64,
    pub depth: f64,
}

impl GeoPoint {
    pub fn new(lon: f64, lat: f64, depth: f64) -> Self {
        Self { lon, lat, depth }
    }

    fn to_cartesian(self) -> [f64; 3] {
        let r = EARTH_RADIUS_KM - self.depth;
        let (lon, lat) = (self.lon.to_radians(), self.lat.to_radians());
        [
            r * lat.cos() * lon.cos(),
            r * lat.cos() * lon.sin(),
            r * lat.sin(),
        ]
    }

    fn from_cartesian([x, y, z]: [f64; 3]) -> Self {
        let r = (x * x + y * y + z * z).sqrt();
        let lat = if r == 0.0 { 0.0 } else { (z / r).asin().to_degrees() };
        Self {
            lon: y.atan2(x).to_degrees(),
            lat,
            depth: EARTH_RADIUS_KM - r,
        }
    }
}

/// Returns the point reached by travelling `dist_km` along the straight
/// chord (not the great circle) from `from` toward `to`.
///
/// Distances longer than the chord extrapolate past `to`. When both points
/// coincide there is no direction, and `from` is returned.
pub fn straight_waypoint(from: GeoPoint, to: GeoPoint, dist_km: f64) -> GeoPoint {
    let p1 = from.to_cartesian();
    let p2 = to.to_cartesian();
    let delta = [p2[0] - p1[0], p2[1] - p1[1], p2[2] - p1[2]];
    let len = (delta[0] * delta[0] + delta[1] * delta[1] + delta[2] * delta[2]).sqrt();
    if len == 0.0 {
        return from;
    }

    let ratio = dist_km / len;
    GeoPoint::from_cartesian([
        p1[0] + delta[0] * ratio,
        p1[1] + delta[1] * ratio,
        p1[2] + delta[2] * ratio,
    ])
}
