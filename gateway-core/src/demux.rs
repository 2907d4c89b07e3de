//! C2 — Demultiplexer (spec.md §4.2): owns the single [`InputBuffer`], drives
//! [`crate::frame_finder::find_frame`] in a loop, and trims garbage bytes.
//!
//! Grounded on the teacher's `UbxRtcmNmeaParserIter::next` drain-on-mismatch
//! loop (`ublox::parser`): ingest bytes, repeatedly pull the earliest frame
//! off the front, and fall back to single-byte drops when nothing is found.

use tracing::{trace, warn};

use crate::buffer::InputBuffer;
use crate::frame::{FindOutcome, Frame};
use crate::frame_finder::{classify_rejection, find_frame, FrameLimits};

/// One iteration's worth of demultiplexing: frames ready for decode, plus a
/// count of bytes silently dropped as unrecoverable garbage this round.
#[derive(Debug, Default)]
pub struct DrainResult {
    pub frames: Vec<Frame>,
    pub garbage_bytes_dropped: usize,
}

pub struct Demultiplexer {
    buffer: InputBuffer,
    limits: FrameLimits,
    max_frames_per_drain: usize,
}

impl Demultiplexer {
    pub fn new(max_buffer_bytes: usize, limits: FrameLimits, max_frames_per_drain: usize) -> Self {
        Self {
            buffer: InputBuffer::new(max_buffer_bytes),
            limits,
            max_frames_per_drain,
        }
    }

    /// Append newly-read bytes to the buffer (spec.md §4.2 "Backpressure / overflow").
    pub fn ingest(&mut self, bytes: &[u8]) {
        self.buffer.ingest(bytes);
    }

    pub fn buffered_len(&self) -> usize {
        self.buffer.len()
    }

    /// Pull as many complete frames off the front of the buffer as are
    /// available, up to `max_frames_per_drain`, trimming leading garbage and
    /// dropping a single byte at a time when no candidate is found at all.
    pub fn drain(&mut self) -> DrainResult {
        let mut result = DrainResult::default();
        while result.frames.len() < self.max_frames_per_drain {
            match find_frame(self.buffer.as_slice(), &self.limits) {
                FindOutcome::Found { frame, start_offset } => {
                    if start_offset > 0 {
                        trace!(start_offset, "trimming pre-frame garbage");
                        result.garbage_bytes_dropped += start_offset;
                    }
                    let total = start_offset + frame.bytes.len();
                    self.buffer.drain_front(total);
                    result.frames.push(frame);
                },
                FindOutcome::Partial(_) => break,
                FindOutcome::None => {
                    if self.buffer.is_empty() {
                        break;
                    }
                    // TransientByteLoss (spec.md §4.2, §7): never surfaced to a
                    // caller, but worth a forensic reason in the log.
                    let reason = classify_rejection(self.buffer.as_slice(), &self.limits);
                    warn!(%reason, "no plausible frame candidate, dropping one byte");
                    self.buffer.drain_front(1);
                    result.garbage_bytes_dropped += 1;
                },
            }
        }
        result
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::checksum::ubx_checksum;
    use crate::constants::MAX_BUFFER_BYTES_DEFAULT;
    use crate::frame::FrameKind;

    fn demux() -> Demultiplexer {
        Demultiplexer::new(MAX_BUFFER_BYTES_DEFAULT, FrameLimits::default(), 50)
    }

    fn ubx_ack_ack() -> Vec<u8> {
        vec![0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x8b, 0x99, 0x50]
    }

    #[test]
    fn decodes_single_frame_with_no_garbage() {
        let mut d = demux();
        d.ingest(&ubx_ack_ack());
        let result = d.drain();
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.garbage_bytes_dropped, 0);
        assert_eq!(d.buffered_len(), 0);
    }

    #[test]
    fn trims_pre_frame_garbage_and_counts_it() {
        let mut d = demux();
        let mut bytes = vec![0x00, 0x01, 0x02];
        bytes.extend(ubx_ack_ack());
        d.ingest(&bytes);
        let result = d.drain();
        assert_eq!(result.frames.len(), 1);
        assert_eq!(result.garbage_bytes_dropped, 3);
    }

    #[test]
    fn incomplete_frame_stays_buffered_until_more_bytes_arrive() {
        let mut d = demux();
        let bytes = ubx_ack_ack();
        d.ingest(&bytes[..bytes.len() - 1]);
        let result = d.drain();
        assert!(result.frames.is_empty());
        assert_eq!(d.buffered_len(), bytes.len() - 1);

        d.ingest(&bytes[bytes.len() - 1..]);
        let result = d.drain();
        assert_eq!(result.frames.len(), 1);
        assert_eq!(d.buffered_len(), 0);
    }

    #[test]
    fn back_to_back_frames_all_decode_in_one_drain() {
        let mut d = demux();
        let mut bytes = ubx_ack_ack();
        bytes.extend(ubx_ack_ack());
        d.ingest(&bytes);
        let result = d.drain();
        assert_eq!(result.frames.len(), 2);
    }

    #[test]
    fn interleaved_protocols_all_decode() {
        let mut d = demux();
        let nmea = b"$GPGGA,123519,4807.038,N,01131.000,E,1,08,0.9,545.4,M,46.9,M,,*47\r\n".to_vec();
        let mut bytes = ubx_ack_ack();
        bytes.extend_from_slice(&nmea);
        bytes.extend(ubx_ack_ack());
        d.ingest(&bytes);
        let result = d.drain();
        assert_eq!(result.frames.len(), 3);
        assert_eq!(result.frames[1].kind, FrameKind::Nmea);
    }

    #[test]
    fn max_frames_per_drain_caps_a_single_call() {
        let mut d = Demultiplexer::new(MAX_BUFFER_BYTES_DEFAULT, FrameLimits::default(), 2);
        let mut bytes = Vec::new();
        for _ in 0..5 {
            bytes.extend(ubx_ack_ack());
        }
        d.ingest(&bytes);
        let first = d.drain();
        assert_eq!(first.frames.len(), 2);
        let second = d.drain();
        assert_eq!(second.frames.len(), 2);
        let third = d.drain();
        assert_eq!(third.frames.len(), 1);
    }

    #[test]
    fn unrecoverable_noise_drops_one_byte_at_a_time() {
        let mut d = demux();
        d.ingest(&[0x00, 0x00, 0x00]);
        let result = d.drain();
        assert!(result.frames.is_empty());
        assert_eq!(result.garbage_bytes_dropped, 3);
        assert_eq!(d.buffered_len(), 0);
    }

    #[test]
    fn bad_checksum_frame_is_treated_as_garbage_byte_by_byte() {
        let mut d = demux();
        let mut bytes = ubx_ack_ack();
        *bytes.last_mut().unwrap() ^= 0xff;
        let good = ubx_ack_ack();
        bytes.extend(good);
        d.ingest(&bytes);
        let result = d.drain();
        // the corrupted frame's bytes are dropped one at a time until the
        // good frame at the tail is found.
        assert_eq!(result.frames.len(), 1);
        assert!(result.garbage_bytes_dropped > 0);
        let (ck_a, _) = ubx_checksum(&[0x05, 0x01, 0x02, 0x00, 0x06, 0x8b]);
        assert_eq!(ck_a, 0x99);
    }
}
