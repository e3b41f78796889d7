//! Great-circle navigation primitives
//!
//! All distances are in meters, angles in degrees, speeds in knots unless a
//! name says otherwise. The earth is a sphere of [`EARTH_RADIUS`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AisError;

/// Mean earth radius in meters
pub const EARTH_RADIUS: f64 = 6_371_000.0;
pub const NAUTICAL_MILE: f64 = 1852.0;
pub const KN_TO_MS: f64 = NAUTICAL_MILE / 3600.0;
pub const MS_TO_KN: f64 = 3600.0 / NAUTICAL_MILE;

/// A geographic position expressed in degrees latitude and longitude.
/// Latitude is positive in the northern hemisphere, negative in the southern.
/// Longitude is positive in the eastern hemisphere, negative in the western.
#[derive(Clone, Copy, PartialEq, Debug, Serialize, Deserialize)]
pub struct GeoPosition {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPosition {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        GeoPosition {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Parses `"<lat>,<lon>"` in decimal degrees
impl FromStr for GeoPosition {
    type Err = AisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| AisError::InvalidField {
            field: "position",
            reason: format!("{:?}: {}", s, reason),
        };
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| invalid("expected <lat>,<lon>"))?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid("bad latitude"))?;
        let longitude: f64 = lon.trim().parse().map_err(|_| invalid("bad longitude"))?;
        if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
            return Err(invalid("out of range"));
        }
        Ok(GeoPosition::new(latitude, longitude))
    }
}

/// Normalize an angle to [0, 360)
pub fn normalize_360(degrees: f64) -> f64 {
    let d = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if d >= 360.0 {
        0.0
    } else {
        d
    }
}

/// Normalize an angle to (-180, 180]
pub fn normalize_180(degrees: f64) -> f64 {
    let d = normalize_360(degrees);
    if d > 180.0 {
        d - 360.0
    } else {
        d
    }
}

/// Haversine distance in meters and initial bearing in degrees [0, 360)
pub fn dist_and_bearing(from: &GeoPosition, to: &GeoPosition) -> (f64, f64) {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let dlat = lat2 - lat1;
    let dlon = (to.longitude - from.longitude).to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let distance = 2.0 * EARTH_RADIUS * a.sqrt().atan2((1.0 - a).sqrt());

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    let bearing = normalize_360(y.atan2(x).to_degrees());

    (distance, bearing)
}

/// Position reached from `origin` after `distance` meters on initial `bearing`
pub fn destination(origin: &GeoPosition, bearing: f64, distance: f64) -> GeoPosition {
    let lat1 = origin.latitude.to_radians();
    let lon1 = origin.longitude.to_radians();
    let brg = bearing.to_radians();
    let delta = distance / EARTH_RADIUS;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * brg.cos()).asin();
    let lon2 = lon1
        + (brg.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    GeoPosition::new(lat2.to_degrees(), normalize_180(lon2.to_degrees()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64, tolerance: f64) -> bool {
        (a - b).abs() < tolerance
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_360(370.0), 10.0);
        assert_eq!(normalize_360(-10.0), 350.0);
        assert_eq!(normalize_360(360.0), 0.0);
        assert_eq!(normalize_180(180.0), 180.0);
        assert_eq!(normalize_180(-180.0), 180.0);
        assert_eq!(normalize_180(190.0), -170.0);
        assert_eq!(normalize_180(-90.0), -90.0);
    }

    #[test]
    fn test_one_minute_of_latitude() {
        let a = GeoPosition::new(50.0, 4.0);
        let b = GeoPosition::new(50.0 + 1.0 / 60.0, 4.0);
        let (d, brg) = dist_and_bearing(&a, &b);
        // One arc minute on a 6371 km sphere
        assert!(close(d, 1853.25, 0.5));
        assert!(close(brg, 0.0, 1e-9));
    }

    #[test]
    fn test_distance_symmetric_bearing_reversed() {
        let a = GeoPosition::new(52.37, 4.89);
        let b = GeoPosition::new(51.92, 4.48);
        let (d1, b1) = dist_and_bearing(&a, &b);
        let (d2, b2) = dist_and_bearing(&b, &a);
        assert!(close(d1, d2, 1e-6));
        // Short leg, so convergence of meridians is small
        assert!(close(normalize_180(b2 - (b1 + 180.0)), 0.0, 0.5));
    }

    #[test]
    fn test_destination_inverts_dist_and_bearing() {
        let origin = GeoPosition::new(-33.86, 151.21);
        for bearing in [0.0, 45.0, 135.0, 270.0, 359.0] {
            let p = destination(&origin, bearing, 10_000.0);
            let (d, b) = dist_and_bearing(&origin, &p);
            assert!(close(d, 10_000.0, 1e-3));
            assert!(close(normalize_180(b - bearing), 0.0, 1e-6));
        }
    }

    #[test]
    fn test_destination_crosses_antimeridian() {
        let p = destination(&GeoPosition::new(0.0, 179.99), 90.0, 5_000.0);
        assert!(p.longitude < -179.9);
    }

    #[test]
    fn test_parse_position() {
        let p: GeoPosition = "52.5, -4.25".parse().unwrap();
        assert_eq!(p, GeoPosition::new(52.5, -4.25));
        assert!("52.5".parse::<GeoPosition>().is_err());
        assert!("95,0".parse::<GeoPosition>().is_err());
    }

    #[test]
    fn test_unit_constants() {
        assert!(close(10.0 * KN_TO_MS, 5.1444, 1e-4));
        assert!(close(KN_TO_MS * MS_TO_KN, 1.0, 1e-12));
    }
}
