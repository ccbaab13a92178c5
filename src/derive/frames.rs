use chrono::{DateTime, Utc};
use std::f64::consts::TAU;

use super::types::GeodeticPosition;
use crate::oem::StateVector;

// WGS-84
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6378.137;
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563;
const ECCENTRICITY_SQ: f64 = EARTH_FLATTENING * (2.0 - EARTH_FLATTENING);

const MAX_ITERATIONS: usize = 10;
const LATITUDE_TOLERANCE_RAD: f64 = 1e-12;

/// Greenwich mean sidereal angle in radians, in `[0, 2π)`.
pub fn sidereal_angle(epoch: DateTime<Utc>) -> f64 {
    sgp4::iau_epoch_to_sidereal_time(sgp4::julian_years_since_j2000(&epoch.naive_utc()))
        .rem_euclid(TAU)
}

/// Rotate an inertial position into the Earth-fixed frame.
///
/// Only Earth rotation is applied; precession and nutation since J2000 shift the
/// ground track by well under a degree, far below what a reverse geocode resolves.
pub fn inertial_to_earth_fixed(position: [f64; 3], gmst: f64) -> [f64; 3] {
    let (sin_gmst, cos_gmst) = gmst.sin_cos();
    [
        position[0] * cos_gmst + position[1] * sin_gmst,
        -position[0] * sin_gmst + position[1] * cos_gmst,
        position[2],
    ]
}

/// Earth-fixed cartesian (km) to geodetic coordinates.
pub fn earth_fixed_to_geodetic(ecef: [f64; 3]) -> GeodeticPosition {
    let [x, y, z] = ecef;
    let a = EARTH_EQUATORIAL_RADIUS_KM;
    let p = (x * x + y * y).sqrt();
    let longitude = y.atan2(x);

    let prime_vertical = |lat: f64| {
        let sin_lat = lat.sin();
        a / (1.0 - ECCENTRICITY_SQ * sin_lat * sin_lat).sqrt()
    };
    // Valid at every latitude, including the poles where p / cos(lat) blows up.
    let height = |lat: f64| {
        let (sin_lat, cos_lat) = lat.sin_cos();
        p * cos_lat + z * sin_lat - a * a / prime_vertical(lat)
    };

    let mut latitude = z.atan2(p * (1.0 - ECCENTRICITY_SQ));
    for _ in 0..MAX_ITERATIONS {
        let n = prime_vertical(latitude);
        let h = height(latitude);
        let next = z.atan2(p * (1.0 - ECCENTRICITY_SQ * n / (n + h)));
        let delta = (next - latitude).abs();
        latitude = next;
        if delta < LATITUDE_TOLERANCE_RAD {
            break;
        }
    }

    GeodeticPosition {
        latitude_deg: latitude.to_degrees(),
        longitude_deg: longitude.to_degrees(),
        altitude_km: height(latitude),
    }
}

/// Sub-satellite point of a state vector at its own epoch.
pub fn geodetic(vector: &StateVector) -> GeodeticPosition {
    let gmst = sidereal_angle(vector.epoch);
    earth_fixed_to_geodetic(inertial_to_earth_fixed(vector.position, gmst))
}
