//! WGS-84 ECEF -> geodetic conversion (spec.md §4.3 RTCM 1005).
//!
//! Grounded on the teacher's `PositionECEF`/`PositionLLA`/`ToLLA` type split
//! (`types.rs`): kept as a standalone, independently-testable unit rather
//! than folded into the RTCM 1005 decoder.

const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257223563;
const MAX_ITERATIONS: u32 = 10;
const CONVERGENCE_RAD: f64 = 1e-12;

/// An Earth-Centered Earth-Fixed coordinate, in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ecef {
    pub x_m: f64,
    pub y_m: f64,
    pub z_m: f64,
}

/// A geodetic coordinate on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub height_m: f64,
}

/// Iterative closed-form ECEF -> geodetic conversion (spec.md §4.3):
/// `a = 6378137.0`, `f = 1/298.257223563`, iterate latitude until
/// `|delta_lat| < 1e-12` rad or 10 iterations.
pub fn ecef_to_geodetic(ecef: Ecef) -> Geodetic {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let p = (ecef.x_m * ecef.x_m + ecef.y_m * ecef.y_m).sqrt();

    if p < f64::EPSILON {
        // On the polar axis: longitude is undefined, conventionally zero.
        let lat = if ecef.z_m >= 0.0 { 90.0 } else { -90.0 };
        let height = ecef.z_m.abs() - WGS84_A * (1.0 - WGS84_F);
        return Geodetic {
            lat_deg: lat,
            lon_deg: 0.0,
            height_m: height,
        };
    }

    let lon = ecef.y_m.atan2(ecef.x_m);

    let mut lat = (ecef.z_m / p).atan();
    let mut height = 0.0;
    for _ in 0..MAX_ITERATIONS {
        let sin_lat = lat.sin();
        let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        height = p / lat.cos() - n;
        let new_lat = (ecef.z_m / p * (1.0 - e2 * n / (n + height)).recip()).atan();
        let delta = (new_lat - lat).abs();
        lat = new_lat;
        if delta < CONVERGENCE_RAD {
            break;
        }
    }

    Geodetic {
        lat_deg: lat.to_degrees(),
        lon_deg: lon.to_degrees(),
        height_m: height,
    }
}
