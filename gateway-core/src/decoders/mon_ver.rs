//! MON-VER (class 0x0A, id 0x04): software/hardware version strings.

use crate::error::DecodeError;
use crate::events::{EventTimestamp, ReceiverVersion};

pub const CLASS: u8 = 0x0a;
pub const ID: u8 = 0x04;
const SW_VERSION_LEN: usize = 30;
const HW_VERSION_LEN: usize = 10;
const MIN_LEN: usize = SW_VERSION_LEN + HW_VERSION_LEN;
const EXTENSION_LEN: usize = 30;

fn nul_trimmed_ascii(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

pub fn decode(payload: &[u8]) -> Result<ReceiverVersion, DecodeError> {
    if payload.len() < MIN_LEN {
        return Err(DecodeError {
            message: "MON-VER",
            expected_min_len: MIN_LEN,
            got_len: payload.len(),
        });
    }
    let sw_version = nul_trimmed_ascii(&payload[0..SW_VERSION_LEN]);
    let hw_version = nul_trimmed_ascii(&payload[SW_VERSION_LEN..MIN_LEN]);

    let mut extensions = Vec::new();
    let mut offset = MIN_LEN;
    while offset + EXTENSION_LEN <= payload.len() {
        extensions.push(nul_trimmed_ascii(&payload[offset..offset + EXTENSION_LEN]));
        offset += EXTENSION_LEN;
    }

    Ok(ReceiverVersion {
        sw_version,
        hw_version,
        extensions,
        timestamp: EventTimestamp::now(),
    })
}
