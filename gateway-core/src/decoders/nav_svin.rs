//! NAV-SVIN (id 0x3B): survey-in progress and accuracy.

use crate::error::DecodeError;
use crate::events::{EventTimestamp, SurveyIn};

pub const CLASS: u8 = 0x01;
pub const ID: u8 = 0x3b;
const MIN_LEN: usize = 40;

pub fn decode(payload: &[u8]) -> Result<SurveyIn, DecodeError> {
    if payload.len() < MIN_LEN {
        return Err(DecodeError {
            message: "NAV-SVIN",
            expected_min_len: MIN_LEN,
            got_len: payload.len(),
        });
    }
    let duration_s = u32::from_le_bytes(payload[8..12].try_into().unwrap());
    let mean_x_cm = i32::from_le_bytes(payload[12..16].try_into().unwrap());
    let mean_y_cm = i32::from_le_bytes(payload[16..20].try_into().unwrap());
    let mean_z_cm = i32::from_le_bytes(payload[20..24].try_into().unwrap());
    let mean_x_hp = payload[24] as i8;
    let mean_y_hp = payload[25] as i8;
    let mean_z_hp = payload[26] as i8;
    let mean_acc_tenth_mm = u32::from_le_bytes(payload[28..32].try_into().unwrap());
    let observations = u32::from_le_bytes(payload[32..36].try_into().unwrap());
    let valid = payload[36] & 0b1 != 0;
    let active = payload[37] & 0b1 != 0;

    Ok(SurveyIn {
        duration_s,
        mean_ecef_cm: (mean_x_cm, mean_y_cm, mean_z_cm),
        mean_ecef_hp_tenth_mm: (mean_x_hp, mean_y_hp, mean_z_hp),
        mean_acc_tenth_mm,
        observations,
        valid,
        active,
        timestamp: EventTimestamp::now(),
    })
}
