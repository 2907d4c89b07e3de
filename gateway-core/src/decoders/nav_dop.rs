//! NAV-DOP (id 0x04): seven dilution-of-precision fields, each ×0.01.

use crate::error::DecodeError;
use crate::events::{Dop, EventTimestamp};

pub const CLASS: u8 = 0x01;
pub const ID: u8 = 0x04;
const MIN_LEN: usize = 18;

pub fn decode(payload: &[u8]) -> Result<Dop, DecodeError> {
    if payload.len() < MIN_LEN {
        return Err(DecodeError {
            message: "NAV-DOP",
            expected_min_len: MIN_LEN,
            got_len: payload.len(),
        });
    }
    let field = |offset: usize| u16::from_le_bytes(payload[offset..offset + 2].try_into().unwrap()) as f64 * 0.01;
    Ok(Dop {
        gdop: field(4),
        pdop: field(6),
        tdop: field(8),
        vdop: field(10),
        hdop: field(12),
        ndop: field(14),
        edop: field(16),
        timestamp: EventTimestamp::now(),
    })
}
