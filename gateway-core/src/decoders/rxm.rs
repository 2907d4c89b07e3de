//! RXM-SFRBX, RXM-RAWX (presence-only extraction) and RXM-COR (correction
//! stream status, feeds [`crate::correction_store`]).

use bitflags::bitflags;

use crate::error::DecodeError;
use crate::events::{BroadcastPayload, EventTimestamp, GnssId};

pub mod sfrbx {
    use super::*;

    pub const CLASS: u8 = 0x02;
    pub const ID: u8 = 0x13;
    const MIN_LEN: usize = 2;

    pub fn decode(payload: &[u8]) -> Result<BroadcastPayload, DecodeError> {
        if payload.len() < MIN_LEN {
            return Err(DecodeError {
                message: "RXM-SFRBX",
                expected_min_len: MIN_LEN,
                got_len: payload.len(),
            });
        }
        Ok(BroadcastPayload::RxmSfrbx {
            gnss_id: GnssId::from_u8(payload[0]),
            sv_id: payload[1],
        })
    }
}

pub mod rawx {
    use super::*;

    pub const CLASS: u8 = 0x02;
    pub const ID: u8 = 0x15;
    const MIN_LEN: usize = 16;
    const NUM_MEAS_OFFSET: usize = 11;

    pub fn decode(payload: &[u8]) -> Result<BroadcastPayload, DecodeError> {
        if payload.len() < MIN_LEN {
            return Err(DecodeError {
                message: "RXM-RAWX",
                expected_min_len: MIN_LEN,
                got_len: payload.len(),
            });
        }
        Ok(BroadcastPayload::RxmRawx {
            num_meas: payload[NUM_MEAS_OFFSET],
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxmCorSource {
    Sbas,
    Rtcm,
    Spartn,
    None,
}

#[derive(Debug, Clone, Copy)]
pub struct RxmCor {
    pub version: u8,
    pub valid: bool,
    pub stale: bool,
    pub sbas: bool,
    pub rtcm: bool,
    pub spartn: bool,
    pub msg_type: u16,
    pub sub_type: u16,
    pub num_msgs: u16,
    pub age_ms: u32,
    pub timestamp: EventTimestamp,
}

impl RxmCor {
    pub fn source(&self) -> RxmCorSource {
        if self.spartn {
            RxmCorSource::Spartn
        } else if self.rtcm {
            RxmCorSource::Rtcm
        } else if self.sbas {
            RxmCorSource::Sbas
        } else {
            RxmCorSource::None
        }
    }
}

bitflags! {
    #[derive(Debug)]
    struct RxmCorFlags: u16 {
        const VALID = 0x0001;
        const STALE = 0x0002;
        const SBAS = 0x0010;
        const RTCM = 0x0020;
        const SPARTN = 0x0040;
    }
}

pub mod cor {
    use super::*;

    pub const CLASS: u8 = 0x02;
    pub const ID: u8 = 0x34;
    const MIN_LEN: usize = 16;

    pub fn decode(payload: &[u8]) -> Result<RxmCor, DecodeError> {
        if payload.len() < MIN_LEN {
            return Err(DecodeError {
                message: "RXM-COR",
                expected_min_len: MIN_LEN,
                got_len: payload.len(),
            });
        }
        let flags = RxmCorFlags::from_bits_truncate(u16::from_le_bytes(payload[2..4].try_into().unwrap()));
        Ok(RxmCor {
            version: payload[0],
            valid: flags.contains(RxmCorFlags::VALID),
            stale: flags.contains(RxmCorFlags::STALE),
            sbas: flags.contains(RxmCorFlags::SBAS),
            rtcm: flags.contains(RxmCorFlags::RTCM),
            spartn: flags.contains(RxmCorFlags::SPARTN),
            msg_type: u16::from_le_bytes(payload[4..6].try_into().unwrap()),
            sub_type: u16::from_le_bytes(payload[6..8].try_into().unwrap()),
            num_msgs: u16::from_le_bytes(payload[8..10].try_into().unwrap()),
            age_ms: u32::from_le_bytes(payload[10..14].try_into().unwrap()),
            timestamp: EventTimestamp::now(),
        })
    }
}
