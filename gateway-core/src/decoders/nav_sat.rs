//! NAV-SAT (id 0x35) decode: per-SV info plus SBAS/diff-correction aggregates
//! consumed by [`crate::correction_store`].

use bitflags::bitflags;

use crate::error::DecodeError;
use crate::events::{EventTimestamp, GnssId, SatInfo, SatelliteSnapshot};

pub const CLASS: u8 = 0x01;
pub const ID: u8 = 0x35;
const HEADER_LEN: usize = 8;
const ENTRY_LEN: usize = 12;

bitflags! {
    #[derive(Debug)]
    struct SatFlags: u32 {
        const SV_USED = 0x0000_0008;
        const DIFF_CORR = 0x0000_0040;
        const SMOOTHED = 0x0000_0080;
    }
}

pub fn decode(payload: &[u8]) -> Result<SatelliteSnapshot, DecodeError> {
    if payload.len() < HEADER_LEN {
        return Err(DecodeError {
            message: "NAV-SAT",
            expected_min_len: HEADER_LEN,
            got_len: payload.len(),
        });
    }
    let num_svs = payload[5] as usize;
    let expected_len = HEADER_LEN + num_svs * ENTRY_LEN;
    if payload.len() < expected_len {
        return Err(DecodeError {
            message: "NAV-SAT",
            expected_min_len: expected_len,
            got_len: payload.len(),
        });
    }

    let mut sats = Vec::with_capacity(num_svs);
    for i in 0..num_svs {
        let base = HEADER_LEN + i * ENTRY_LEN;
        let entry = &payload[base..base + ENTRY_LEN];
        let raw_flags = u32::from_le_bytes(entry[8..12].try_into().unwrap());
        let flags = SatFlags::from_bits_truncate(raw_flags);
        sats.push(SatInfo {
            gnss_id: GnssId::from_u8(entry[0]),
            sv_id: entry[1],
            cno_dbhz: entry[2],
            elev_deg: entry[3] as i8,
            azim_deg: i16::from_le_bytes(entry[4..6].try_into().unwrap()),
            pr_res_m: i16::from_le_bytes(entry[6..8].try_into().unwrap()) as f64 * 0.1,
            quality_ind: (raw_flags & 0b111) as u8,
            sv_used: flags.contains(SatFlags::SV_USED),
            health: ((raw_flags >> 4) & 0b11) as u8,
            diff_corr: flags.contains(SatFlags::DIFF_CORR),
            smoothed: flags.contains(SatFlags::SMOOTHED),
        });
    }

    let sbas_in_use = sats
        .iter()
        .any(|s| s.gnss_id == GnssId::Sbas && s.sv_used && s.diff_corr);
    let diff_corr_count = sats.iter().filter(|s| s.diff_corr).count() as u32;

    Ok(SatelliteSnapshot {
        sbas_in_use,
        diff_corr_in_use: diff_corr_count > 0,
        diff_corr_count,
        sats,
        timestamp: EventTimestamp::now(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    fn entry(gnss_id: u8, flags: u32) -> [u8; ENTRY_LEN] {
        let mut e = [0u8; ENTRY_LEN];
        e[0] = gnss_id;
        e[1] = 5;
        e[8..12].copy_from_slice(&flags.to_le_bytes());
        e
    }

    #[test]
    fn rejects_short_header() {
        assert!(decode(&[0u8; 4]).is_err());
    }

    #[test]
    fn rejects_truncated_sv_array() {
        let mut p = vec![0u8; HEADER_LEN];
        p[5] = 2;
        assert!(decode(&p).is_err());
    }

    #[test]
    fn sbas_in_use_requires_sv_used_and_diff_corr() {
        let mut p = vec![0u8; HEADER_LEN];
        p[5] = 1;
        // gnssId = 1 (SBAS), svUsed bit3 + diffCorr bit6 set.
        p.extend_from_slice(&entry(1, 0b0100_1000));
        let snap = decode(&p).unwrap();
        assert!(snap.sbas_in_use);
        assert_eq!(snap.diff_corr_count, 1);
    }

    #[test]
    fn sbas_not_in_use_without_diff_corr() {
        let mut p = vec![0u8; HEADER_LEN];
        p[5] = 1;
        p.extend_from_slice(&entry(1, 0b0000_1000));
        let snap = decode(&p).unwrap();
        assert!(!snap.sbas_in_use);
        assert_eq!(snap.diff_corr_count, 0);
    }
}
