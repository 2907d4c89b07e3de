//! NAV-PVT (class 0x01, id 0x07) decode and Table 1 fix-label computation.
//!
//! Grounded on the teacher's `ubx_packets::packets::nav_pvt` field layout,
//! translated from macro-generated accessors into a hand-written pure function.
//! `NavPvtFlags` mirrors the teacher's own `bitflags!`-defined `NavPvtFlags`
//! (`nav_pvt/common.rs`), including its choice to name the carrier-solution
//! bit pair as two flags rather than a packed 2-bit field. `NavPvtValidFlags`
//! mirrors the teacher's own struct of the same name, trimmed to the three
//! bits a consuming event cares about (date/time validity, full resolution).

use bitflags::bitflags;

use crate::error::DecodeError;
use crate::events::{CarrierSolution, EventTimestamp, FixType, PositionFix};

pub const CLASS: u8 = 0x01;
pub const ID: u8 = 0x07;
const MIN_LEN: usize = 84;

bitflags! {
    #[derive(Debug)]
    struct NavPvtFlags: u8 {
        const GNSS_FIX_OK = 0x01;
        const DIFF_SOLN = 0x02;
        const CARR_SOLN_FLOAT = 0x40;
        const CARR_SOLN_FIXED = 0x80;
    }
}

/// Mirrors the teacher's own `NavPvtValidFlags` (`nav_pvt/common.rs`).
bitflags! {
    #[derive(Debug)]
    struct NavPvtValidFlags: u8 {
        const VALID_DATE = 0x01;
        const VALID_TIME = 0x02;
        const FULLY_RESOLVED = 0x04;
    }
}

pub fn decode(payload: &[u8]) -> Result<PositionFix, DecodeError> {
    if payload.len() < MIN_LEN {
        return Err(DecodeError {
            message: "NAV-PVT",
            expected_min_len: MIN_LEN,
            got_len: payload.len(),
        });
    }

    let itow_ms = u32::from_le_bytes(payload[0..4].try_into().unwrap());
    let year = u16::from_le_bytes(payload[4..6].try_into().unwrap());
    let month = payload[6];
    let day = payload[7];
    let hour = payload[8];
    let min = payload[9];
    let sec = payload[10];
    let valid = NavPvtValidFlags::from_bits_truncate(payload[11]);
    let valid_date = valid.contains(NavPvtValidFlags::VALID_DATE);
    let valid_time = valid.contains(NavPvtValidFlags::VALID_TIME);
    let fully_resolved = valid.contains(NavPvtValidFlags::FULLY_RESOLVED);
    let fix_type = FixType::from_u8(payload[20]);
    let flags = NavPvtFlags::from_bits_truncate(payload[21]);
    let gnss_fix_ok = flags.contains(NavPvtFlags::GNSS_FIX_OK);
    let diff_soln = flags.contains(NavPvtFlags::DIFF_SOLN);
    let carr_soln = if flags.contains(NavPvtFlags::CARR_SOLN_FIXED) {
        CarrierSolution::Fixed
    } else if flags.contains(NavPvtFlags::CARR_SOLN_FLOAT) {
        CarrierSolution::Float
    } else {
        CarrierSolution::None
    };
    let num_sv = payload[23];
    let lon_deg = i32::from_le_bytes(payload[24..28].try_into().unwrap()) as f64 * 1e-7;
    let lat_deg = i32::from_le_bytes(payload[28..32].try_into().unwrap()) as f64 * 1e-7;
    let height_ellipsoid_mm = i32::from_le_bytes(payload[32..36].try_into().unwrap());
    let height_msl_mm = i32::from_le_bytes(payload[36..40].try_into().unwrap());
    let h_acc_mm = u32::from_le_bytes(payload[40..44].try_into().unwrap());
    let v_acc_mm = u32::from_le_bytes(payload[44..48].try_into().unwrap());

    // Differential-age extension: not part of every protocol revision's fixed
    // 84-byte payload, but the spec requires extraction whenever present.
    let diff_age_ms = if payload.len() >= MIN_LEN + 2 {
        let raw = u16::from_le_bytes(payload[84..86].try_into().unwrap());
        if raw == 0xffff {
            None
        } else {
            Some(raw)
        }
    } else {
        None
    };

    let label = fix_label(fix_type, diff_soln, carr_soln);

    Ok(PositionFix {
        itow_ms,
        year,
        month,
        day,
        hour,
        min,
        sec,
        valid_date,
        valid_time,
        fully_resolved,
        fix_type,
        gnss_fix_ok,
        diff_soln,
        carr_soln,
        num_sv,
        lon_deg,
        lat_deg,
        height_ellipsoid_mm,
        height_msl_mm,
        h_acc_mm,
        v_acc_mm,
        diff_age_ms,
        label,
        timestamp: EventTimestamp::now(),
    })
}

/// Table 1 (spec.md §4.3), first match wins.
pub fn fix_label(fix_type: FixType, diff_soln: bool, carr_soln: CarrierSolution) -> &'static str {
    use CarrierSolution::*;
    use FixType::*;

    if fix_type == NoFix {
        return "No Fix";
    }
    if carr_soln == Fixed && fix_type == Fix2D {
        return "RTK Fix 2D";
    }
    if carr_soln == Fixed {
        return "RTK Fix";
    }
    if carr_soln == Float && fix_type == Fix2D {
        return "RTK Float 2D";
    }
    if carr_soln == Float {
        return "RTK Float";
    }
    if diff_soln && fix_type == Fix2D {
        return "DGPS 2D";
    }
    if diff_soln {
        return "DGPS";
    }
    match fix_type {
        Fix2D => "Single 2D",
        Fix3D => "Single 3D",
        DeadReckoning => "Dead Reckoning",
        GnssDeadReckoning => "GNSS+DR",
        TimeOnly => "Time Only",
        NoFix => unreachable!("handled above"),
    }
}
