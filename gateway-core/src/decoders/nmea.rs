//! NMEA: five-character talker+sentence tag for rate accounting; the whole
//! sentence (CRLF included) is forwarded to the NMEA relay sink untouched.

use crate::error::DecodeError;
use crate::events::{Broadcast, BroadcastPayload, EventTimestamp};

const TAG_LEN: usize = 5;
const MIN_LEN: usize = 1 + TAG_LEN;

/// `frame_bytes` is the complete wire frame, `$` through trailing `\r\n`.
pub fn decode(frame_bytes: &[u8]) -> Result<Broadcast, DecodeError> {
    if frame_bytes.len() < MIN_LEN {
        return Err(DecodeError {
            message: "NMEA",
            expected_min_len: MIN_LEN,
            got_len: frame_bytes.len(),
        });
    }
    let sentence = String::from_utf8_lossy(frame_bytes).into_owned();
    let tag = sentence[1..1 + TAG_LEN].to_string();

    Ok(Broadcast {
        payload: BroadcastPayload::Nmea { tag, sentence },
        timestamp: EventTimestamp::now(),
    })
}
