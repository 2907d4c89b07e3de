//! NAV-SIG (id 0x43): per-signal tracking quality and correction usage.

use bitflags::bitflags;

use crate::error::DecodeError;
use crate::events::{EventTimestamp, GnssId, SignalEntry, SignalInfo};

pub const CLASS: u8 = 0x01;
pub const ID: u8 = 0x43;
const HEADER_LEN: usize = 8;
const ENTRY_LEN: usize = 16;

bitflags! {
    #[derive(Debug)]
    struct SigFlags: u16 {
        const PR_USED = 0x0008;
        const CR_USED = 0x0010;
        const DO_USED = 0x0020;
    }
}

pub fn decode(payload: &[u8]) -> Result<SignalInfo, DecodeError> {
    if payload.len() < HEADER_LEN {
        return Err(DecodeError {
            message: "NAV-SIG",
            expected_min_len: HEADER_LEN,
            got_len: payload.len(),
        });
    }
    let num_sigs = payload[5] as usize;
    let expected_len = HEADER_LEN + num_sigs * ENTRY_LEN;
    if payload.len() < expected_len {
        return Err(DecodeError {
            message: "NAV-SIG",
            expected_min_len: expected_len,
            got_len: payload.len(),
        });
    }

    let mut signals = Vec::with_capacity(num_sigs);
    for i in 0..num_sigs {
        let base = HEADER_LEN + i * ENTRY_LEN;
        let entry = &payload[base..base + ENTRY_LEN];
        let raw_flags = u16::from_le_bytes(entry[10..12].try_into().unwrap());
        let sig_flags = SigFlags::from_bits_truncate(raw_flags);
        signals.push(SignalEntry {
            gnss_id: GnssId::from_u8(entry[0]),
            sv_id: entry[1],
            cno_dbhz: entry[6],
            quality: entry[7],
            health: (raw_flags & 0b11) as u8,
            pr_used: sig_flags.contains(SigFlags::PR_USED),
            cr_used: sig_flags.contains(SigFlags::CR_USED),
            do_used: sig_flags.contains(SigFlags::DO_USED),
            corrections_used: ((raw_flags >> 6) & 0b111) as u8,
        });
    }

    Ok(SignalInfo {
        signals,
        timestamp: EventTimestamp::now(),
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rejects_short_header() {
        assert!(decode(&[0u8; 4]).is_err());
    }

    #[test]
    fn decodes_signal_flags() {
        let mut p = vec![0u8; HEADER_LEN];
        p[5] = 1;
        let mut entry = vec![0u8; ENTRY_LEN];
        entry[0] = 0; // GPS
        let flags: u16 = 0b1_1100_1001; // health=01, prUsed, doUsed, corrections=0b011 shifted high bits
        entry[10..12].copy_from_slice(&flags.to_le_bytes());
        p.extend_from_slice(&entry);
        let info = decode(&p).unwrap();
        assert_eq!(info.signals.len(), 1);
        assert_eq!(info.signals[0].health, 0b01);
        assert!(info.signals[0].pr_used);
    }
}
