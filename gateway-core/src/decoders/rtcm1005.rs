//! RTCM 1005 (reference station ARP) bit-level decode plus WGS-84 ECEF ->
//! geodetic conversion (spec.md §4.3).

use crate::error::DecodeError;
use crate::events::{EventTimestamp, ReferenceStation};
use crate::wgs84::{ecef_to_geodetic, Ecef};

pub const MESSAGE_TYPE: u16 = 1005;
const TOTAL_BITS: usize = 152;
const MIN_LEN: usize = TOTAL_BITS.div_ceil(8);
const ECEF_RESOLUTION_M: f64 = 0.0001;

/// Read `n_bits` (<= 64) starting at `start_bit`, MSB-first, as an unsigned value.
fn read_bits(data: &[u8], start_bit: usize, n_bits: usize) -> u64 {
    let mut value: u64 = 0;
    for i in 0..n_bits {
        let bit_index = start_bit + i;
        let byte = data[bit_index / 8];
        let bit = (byte >> (7 - (bit_index % 8))) & 1;
        value = (value << 1) | u64::from(bit);
    }
    value
}

fn read_signed_bits(data: &[u8], start_bit: usize, n_bits: usize) -> i64 {
    let raw = read_bits(data, start_bit, n_bits);
    let sign_bit = 1u64 << (n_bits - 1);
    if raw & sign_bit != 0 {
        (raw as i64) - (1i64 << n_bits)
    } else {
        raw as i64
    }
}

pub fn decode(payload: &[u8]) -> Result<ReferenceStation, DecodeError> {
    if payload.len() < MIN_LEN {
        return Err(DecodeError {
            message: "RTCM 1005",
            expected_min_len: MIN_LEN,
            got_len: payload.len(),
        });
    }

    let station_id = read_bits(payload, 12, 12) as u16;
    let ecef_x_units = read_signed_bits(payload, 34, 38);
    let ecef_y_units = read_signed_bits(payload, 74, 38);
    let ecef_z_units = read_signed_bits(payload, 114, 38);

    let ecef = Ecef {
        x_m: ecef_x_units as f64 * ECEF_RESOLUTION_M,
        y_m: ecef_y_units as f64 * ECEF_RESOLUTION_M,
        z_m: ecef_z_units as f64 * ECEF_RESOLUTION_M,
    };
    let geodetic = ecef_to_geodetic(ecef);

    Ok(ReferenceStation {
        station_id,
        ecef_x_m: ecef.x_m,
        ecef_y_m: ecef.y_m,
        ecef_z_m: ecef.z_m,
        lat_deg: geodetic.lat_deg,
        lon_deg: geodetic.lon_deg,
        height_m: geodetic.height_m,
        timestamp: EventTimestamp::now(),
    })
}

/// Encode fields into a 1005 payload (message-type field included), used by
/// round-trip tests and to cross-check [`decode`] against known fixtures.
#[cfg(test)]
fn encode(station_id: u16, ecef: Ecef) -> Vec<u8> {
    let mut bits = vec![false; TOTAL_BITS];
    let mut write_bits = |start: usize, n: usize, value: u64| {
        for i in 0..n {
            bits[start + i] = (value >> (n - 1 - i)) & 1 != 0;
        }
    };
    write_bits(0, 12, MESSAGE_TYPE as u64);
    write_bits(12, 12, station_id as u64);
    let to_units = |m: f64| (m / ECEF_RESOLUTION_M).round() as i64;
    let x_units = to_units(ecef.x_m) as u64 & ((1u64 << 38) - 1);
    let y_units = to_units(ecef.y_m) as u64 & ((1u64 << 38) - 1);
    let z_units = to_units(ecef.z_m) as u64 & ((1u64 << 38) - 1);
    write_bits(34, 38, x_units);
    write_bits(74, 38, y_units);
    write_bits(114, 38, z_units);

    let mut bytes = vec![0u8; MIN_LEN];
    for (i, &bit) in bits.iter().enumerate() {
        if bit {
            bytes[i / 8] |= 1 << (7 - (i % 8));
        }
    }
    bytes
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_short_payload() {
        assert!(decode(&[0u8; 5]).is_err());
    }

    #[test]
    fn decode_of_encode_is_identity_at_resolution() {
        let ecef = Ecef {
            x_m: 3_875_567.1234,
            y_m: 700_123.4321,
            z_m: 5_002_345.6789,
        };
        let payload = encode(4321, ecef);
        let station = decode(&payload).unwrap();
        assert_eq!(station.station_id, 4321);
        assert!((station.ecef_x_m - ecef.x_m).abs() < ECEF_RESOLUTION_M / 2.0 + 1e-9);
        assert!((station.ecef_y_m - ecef.y_m).abs() < ECEF_RESOLUTION_M / 2.0 + 1e-9);
        assert!((station.ecef_z_m - ecef.z_m).abs() < ECEF_RESOLUTION_M / 2.0 + 1e-9);
    }

    #[test]
    fn negative_coordinates_round_trip() {
        let ecef = Ecef {
            x_m: -3_875_567.1,
            y_m: -700_123.4,
            z_m: -5_002_345.6,
        };
        let payload = encode(1, ecef);
        let station = decode(&payload).unwrap();
        assert!((station.ecef_x_m - ecef.x_m).abs() < 1e-3);
        assert!((station.ecef_y_m - ecef.y_m).abs() < 1e-3);
        assert!((station.ecef_z_m - ecef.z_m).abs() < 1e-3);
    }
}
