//! ACK-ACK / ACK-NAK (class 0x05, ids 0x01/0x00).

use crate::error::DecodeError;
use crate::events::{AckNak, EventTimestamp};

pub const CLASS: u8 = 0x05;
pub const ID_ACK: u8 = 0x01;
pub const ID_NAK: u8 = 0x00;
const MIN_LEN: usize = 2;

pub fn decode(id: u8, payload: &[u8]) -> Result<AckNak, DecodeError> {
    if payload.len() < MIN_LEN {
        return Err(DecodeError {
            message: "ACK/NAK",
            expected_min_len: MIN_LEN,
            got_len: payload.len(),
        });
    }
    Ok(AckNak {
        acked_class: payload[0],
        acked_id: payload[1],
        ack: id == ID_ACK,
        timestamp: EventTimestamp::now(),
    })
}
