//! MON-COMMS (id 0x36): per-port traffic counters and protocol message tallies.

use crate::error::DecodeError;
use crate::events::{CommsStatus, EventTimestamp, PortStats};

pub const CLASS: u8 = 0x0a;
pub const ID: u8 = 0x36;
const HEADER_LEN: usize = 8;
const PORT_LEN: usize = 40;

pub fn decode(payload: &[u8]) -> Result<CommsStatus, DecodeError> {
    if payload.len() < HEADER_LEN {
        return Err(DecodeError {
            message: "MON-COMMS",
            expected_min_len: HEADER_LEN,
            got_len: payload.len(),
        });
    }
    let n_ports = payload[1] as usize;
    let expected_len = HEADER_LEN + n_ports * PORT_LEN;
    if payload.len() < expected_len {
        return Err(DecodeError {
            message: "MON-COMMS",
            expected_min_len: expected_len,
            got_len: payload.len(),
        });
    }

    let mut ports = Vec::with_capacity(n_ports);
    for i in 0..n_ports {
        let base = HEADER_LEN + i * PORT_LEN;
        let port = &payload[base..base + PORT_LEN];
        let overrun_errs = port[20];
        let mut protocol_msg_counts = [0u32; 8];
        for (slot, chunk) in protocol_msg_counts.iter_mut().zip(port[22..38].chunks_exact(2)) {
            *slot = u16::from_le_bytes(chunk.try_into().unwrap()) as u32;
        }
        ports.push(PortStats {
            tx_bytes: u32::from_le_bytes(port[6..10].try_into().unwrap()),
            rx_bytes: u32::from_le_bytes(port[14..18].try_into().unwrap()),
            tx_usage_pct: port[10],
            rx_usage_pct: port[18],
            tx_overruns: overrun_errs & 0b01 != 0,
            rx_overruns: overrun_errs & 0b10 != 0,
            protocol_msg_counts,
        });
    }

    Ok(CommsStatus {
        ports,
        timestamp: EventTimestamp::now(),
    })
}
