//! C1 — FrameFinder (spec.md §4.1): scans the front of an [`crate::buffer::InputBuffer`]
//! for the earliest valid-or-partial frame candidate across UBX, RTCM 3, and NMEA.

use crate::checksum::{nmea_xor, rtcm_crc24q, ubx_checksum};
use crate::constants::*;
use crate::error::FrameError;
use crate::frame::{FindOutcome, Frame, FrameKind, PartialHint};

/// Limits that bound how large a candidate frame is allowed to be before it's
/// rejected as garbage rather than awaited as partial (spec.md §6.5).
#[derive(Debug, Clone, Copy)]
pub struct FrameLimits {
    pub ubx_max_payload: u16,
    pub rtcm_max_payload: u16,
}

impl Default for FrameLimits {
    fn default() -> Self {
        Self {
            ubx_max_payload: UBX_MAX_PAYLOAD_DEFAULT,
            rtcm_max_payload: RTCM_MAX_PAYLOAD_DEFAULT,
        }
    }
}

/// The result of evaluating a single candidate at a fixed offset.
enum Candidate {
    Found(Frame),
    Partial(usize),
    /// Rejected: not a real frame of this kind at this offset. The caller
    /// should keep scanning for the next sync byte of the same kind. The
    /// carried reason is forensic-only (spec.md §4.2 `TransientByteLoss`) —
    /// it never changes control flow, only what `classify_rejection` reports.
    Invalid(FrameError),
}

/// Scan `buf` for the earliest complete-and-valid or plausibly-partial frame
/// across all three protocols (spec.md §4.1 "Selection rule").
pub fn find_frame(buf: &[u8], limits: &FrameLimits) -> FindOutcome {
    let ubx = scan_ubx(buf, limits.ubx_max_payload);
    let rtcm = scan_rtcm(buf, limits.rtcm_max_payload);
    let nmea = scan_nmea(buf);

    let mut winner: Option<(usize, FindOutcome)> = None;
    for candidate in [ubx, rtcm, nmea].into_iter().flatten() {
        let (offset, _) = &candidate;
        if winner.as_ref().is_none_or(|(w_off, _)| offset < w_off) {
            winner = Some(candidate);
        }
    }

    match winner {
        Some((_, outcome)) => outcome,
        None => FindOutcome::None,
    }
}

fn scan_ubx(buf: &[u8], max_payload: u16) -> Option<(usize, FindOutcome)> {
    let mut cursor = 0;
    while cursor < buf.len() {
        let Some(rel) = buf[cursor..].iter().position(|&b| b == UBX_SYNC_CHAR_1) else {
            return None;
        };
        let offset = cursor + rel;
        match eval_ubx_candidate(&buf[offset..], max_payload) {
            Candidate::Found(frame) => {
                return Some((
                    offset,
                    FindOutcome::Found {
                        frame,
                        start_offset: offset,
                    },
                ))
            },
            Candidate::Partial(bytes_needed) => {
                return Some((
                    offset,
                    FindOutcome::Partial(PartialHint {
                        kind: FrameKind::Ubx,
                        bytes_needed,
                    }),
                ))
            },
            Candidate::Invalid(_) => cursor = offset + 1,
        }
    }
    None
}

fn eval_ubx_candidate(from_sync: &[u8], max_payload: u16) -> Candidate {
    if from_sync.len() < UBX_SYNC_SIZE {
        return Candidate::Partial(UBX_SYNC_SIZE - from_sync.len());
    }
    if from_sync[1] != UBX_SYNC_CHAR_2 {
        return Candidate::Invalid(FrameError::UnknownSync);
    }
    if from_sync.len() < UBX_HEADER_LEN {
        return Candidate::Partial(UBX_HEADER_LEN - from_sync.len());
    }
    let len = u16::from_le_bytes([from_sync[UBX_LENGTH_OFFSET], from_sync[UBX_LENGTH_OFFSET + 1]]);
    if len > max_payload {
        return Candidate::Invalid(FrameError::InvalidLength { got: usize::from(len) });
    }
    let total_len = UBX_HEADER_LEN + usize::from(len) + UBX_CHECKSUM_LEN;
    if from_sync.len() < total_len {
        return Candidate::Partial(total_len - from_sync.len());
    }
    let checksum_range = &from_sync[UBX_CLASS_OFFSET..UBX_HEADER_LEN + usize::from(len)];
    let (ck_a, ck_b) = ubx_checksum(checksum_range);
    let (got_a, got_b) = (from_sync[total_len - 2], from_sync[total_len - 1]);
    if (ck_a, ck_b) != (got_a, got_b) {
        return Candidate::Invalid(FrameError::InvalidChecksum {
            expect: (u32::from(ck_a) << 8) | u32::from(ck_b),
            got: (u32::from(got_a) << 8) | u32::from(got_b),
        });
    }
    Candidate::Found(Frame::new(FrameKind::Ubx, &from_sync[..total_len]))
}

fn scan_rtcm(buf: &[u8], max_payload: u16) -> Option<(usize, FindOutcome)> {
    let mut cursor = 0;
    while cursor < buf.len() {
        let Some(rel) = buf[cursor..].iter().position(|&b| b == RTCM_SYNC_CHAR) else {
            return None;
        };
        let offset = cursor + rel;
        match eval_rtcm_candidate(&buf[offset..], max_payload) {
            Candidate::Found(frame) => {
                return Some((
                    offset,
                    FindOutcome::Found {
                        frame,
                        start_offset: offset,
                    },
                ))
            },
            Candidate::Partial(bytes_needed) => {
                return Some((
                    offset,
                    FindOutcome::Partial(PartialHint {
                        kind: FrameKind::Rtcm3,
                        bytes_needed,
                    }),
                ))
            },
            Candidate::Invalid(_) => cursor = offset + 1,
        }
    }
    None
}

fn eval_rtcm_candidate(from_sync: &[u8], max_payload: u16) -> Candidate {
    if from_sync.len() < RTCM_HEADER_SIZE {
        return Candidate::Partial(RTCM_HEADER_SIZE - from_sync.len());
    }
    if from_sync[1] & 0xfc != 0 {
        return Candidate::Invalid(FrameError::UnknownSync);
    }
    let raw_len = u16::from_be_bytes([from_sync[1], from_sync[2]]) & RTCM_LENGTH_MASK;
    let payload_len = if raw_len == RTCM_LENGTH_ESCAPE {
        RTCM_LENGTH_ESCAPED_VALUE
    } else {
        raw_len
    };
    if payload_len == 0 || payload_len > max_payload {
        return Candidate::Invalid(FrameError::InvalidLength { got: usize::from(payload_len) });
    }
    let total_len = RTCM_HEADER_SIZE + usize::from(payload_len) + RTCM_CRC_LEN;
    if from_sync.len() < total_len {
        return Candidate::Partial(total_len - from_sync.len());
    }
    let body = &from_sync[..RTCM_HEADER_SIZE + usize::from(payload_len)];
    let computed = rtcm_crc24q(body);
    let trailer = &from_sync[total_len - RTCM_CRC_LEN..total_len];
    let got = u32::from_be_bytes([0, trailer[0], trailer[1], trailer[2]]);
    if computed != got {
        return Candidate::Invalid(FrameError::InvalidChecksum { expect: computed, got });
    }
    Candidate::Found(Frame::new(FrameKind::Rtcm3, &from_sync[..total_len]))
}

fn scan_nmea(buf: &[u8]) -> Option<(usize, FindOutcome)> {
    let mut cursor = 0;
    while cursor < buf.len() {
        let Some(rel) = buf[cursor..].iter().position(|&b| b == NMEA_SYNC_CHAR) else {
            return None;
        };
        let offset = cursor + rel;
        match eval_nmea_candidate(&buf[offset..]) {
            Candidate::Found(frame) => {
                return Some((
                    offset,
                    FindOutcome::Found {
                        frame,
                        start_offset: offset,
                    },
                ))
            },
            Candidate::Partial(bytes_needed) => {
                return Some((
                    offset,
                    FindOutcome::Partial(PartialHint {
                        kind: FrameKind::Nmea,
                        bytes_needed,
                    }),
                ))
            },
            Candidate::Invalid(_) => cursor = offset + 1,
        }
    }
    None
}

fn is_nmea_body_byte(b: u8) -> bool {
    (0x09..=0x7e).contains(&b) || b == NMEA_END_CHAR_1 || b == NMEA_END_CHAR_2
}

fn eval_nmea_candidate(from_sync: &[u8]) -> Candidate {
    let crlf = from_sync
        .windows(2)
        .position(|w| w[0] == NMEA_END_CHAR_1 && w[1] == NMEA_END_CHAR_2);
    let Some(crlf_pos) = crlf else {
        if from_sync.len() > NMEA_MAX_SENTENCE_LEN {
            return Candidate::Invalid(FrameError::InvalidLength { got: from_sync.len() });
        }
        return Candidate::Partial((NMEA_MIN_FRAME_LEN.saturating_sub(from_sync.len())).max(1));
    };

    let total_len = crlf_pos + NMEA_END_CHARS_LEN;
    if total_len < NMEA_MIN_FRAME_LEN {
        return Candidate::Invalid(FrameError::InvalidLength { got: total_len });
    }
    if !from_sync[..total_len].iter().all(|&b| is_nmea_body_byte(b)) {
        return Candidate::Invalid(FrameError::InvalidAscii);
    }
    let body_no_crlf = &from_sync[..total_len - NMEA_END_CHARS_LEN];
    let Some(star) = body_no_crlf.iter().rposition(|&b| b == b'*') else {
        return Candidate::Invalid(FrameError::InvalidAscii);
    };
    if star + 2 >= body_no_crlf.len() {
        return Candidate::Invalid(FrameError::InvalidLength { got: body_no_crlf.len() });
    }
    let computed = nmea_xor(&from_sync[1..star]);
    let Ok(hex_digits) = core::str::from_utf8(&body_no_crlf[star + 1..star + 3]) else {
        return Candidate::Invalid(FrameError::InvalidAscii);
    };
    let Ok(expected) = u8::from_str_radix(hex_digits, 16) else {
        return Candidate::Invalid(FrameError::InvalidAscii);
    };
    if computed != expected {
        return Candidate::Invalid(FrameError::InvalidChecksum {
            expect: u32::from(expected),
            got: u32::from(computed),
        });
    }
    Candidate::Found(Frame::new(FrameKind::Nmea, &from_sync[..total_len]))
}

/// Classifies why the byte at the front of `buf` isn't a valid frame start,
/// for forensic logging of a `TransientByteLoss` event (spec.md §4.2, §7)
/// when the demultiplexer is about to drop it. Best-effort: re-evaluates
/// only the candidate whose sync byte matches `buf[0]`.
pub(crate) fn classify_rejection(buf: &[u8], limits: &FrameLimits) -> FrameError {
    let reason = match buf.first() {
        Some(&UBX_SYNC_CHAR_1) => eval_ubx_candidate(buf, limits.ubx_max_payload),
        Some(&RTCM_SYNC_CHAR) => eval_rtcm_candidate(buf, limits.rtcm_max_payload),
        Some(&NMEA_SYNC_CHAR) => eval_nmea_candidate(buf),
        _ => return FrameError::UnknownSync,
    };
    match reason {
        Candidate::Invalid(reason) => reason,
        Candidate::Found(_) | Candidate::Partial(_) => FrameError::UnknownSync,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ubx_ack_ack() -> Vec<u8> {
        vec![0xb5, 0x62, 0x05, 0x01, 0x02, 0x00, 0x06, 0x8b, 0x99, 0x50]
    }

    #[test]
    fn finds_exact_ubx_ack_ack() {
        let bytes = ubx_ack_ack();
        match find_frame(&bytes, &FrameLimits::default()) {
            FindOutcome::Found { frame, start_offset } => {
                assert_eq!(start_offset, 0);
                assert_eq!(frame.kind, FrameKind::Ubx);
                assert_eq!(frame.ubx_class_id(), (0x05, 0x01));
            },
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn mid_frame_garbage_is_skipped_as_pre_frame_offset() {
        let mut bytes = vec![0xff, 0xff];
        bytes.extend(ubx_ack_ack());
        match find_frame(&bytes, &FrameLimits::default()) {
            FindOutcome::Found { start_offset, .. } => assert_eq!(start_offset, 2),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn truncated_ubx_is_partial() {
        let bytes = ubx_ack_ack();
        let truncated = &bytes[..bytes.len() - 3];
        match find_frame(truncated, &FrameLimits::default()) {
            FindOutcome::Partial(hint) => {
                assert_eq!(hint.kind, FrameKind::Ubx);
                assert_eq!(hint.bytes_needed, 3);
            },
            other => panic!("expected Partial, got {other:?}"),
        }
    }

    #[test]
    fn bad_checksum_is_rejected_not_partial() {
        let mut bytes = ubx_ack_ack();
        *bytes.last_mut().unwrap() ^= 0xff;
        assert_eq!(find_frame(&bytes, &FrameLimits::default()), FindOutcome::None);
    }

    #[test]
    fn ubx_zero_length_payload_parses() {
        let mut bytes = vec![0xb5, 0x62, 0x05, 0x01, 0x00, 0x00];
        let (a, b) = ubx_checksum(&bytes[2..6]);
        bytes.push(a);
        bytes.push(b);
        match find_frame(&bytes, &FrameLimits::default()) {
            FindOutcome::Found { frame, .. } => assert_eq!(frame.payload().len(), 0),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn ubx_max_length_payload_parses() {
        let mut bytes = vec![0xb5, 0x62, 0x05, 0x01, 0x00, 0x04]; // len = 1024 little-endian
        bytes.extend(std::iter::repeat(0xab).take(1024));
        let (a, b) = ubx_checksum(&bytes[2..]);
        bytes.push(a);
        bytes.push(b);
        match find_frame(&bytes, &FrameLimits::default()) {
            FindOutcome::Found { frame, .. } => assert_eq!(frame.payload().len(), 1024),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    fn rtcm_frame(payload: &[u8]) -> Vec<u8> {
        let actual_len = payload.len() as u16;
        // 0x3ff is reserved to mean "1024" (see RTCM_LENGTH_ESCAPE), since the
        // 10-bit field can otherwise only reach 1023.
        let encoded_len = if actual_len == 1024 { 0x03ff } else { actual_len };
        let mut bytes = vec![0xd3, (encoded_len >> 8) as u8 & 0x03, encoded_len as u8];
        bytes.extend_from_slice(payload);
        let crc = rtcm_crc24q(&bytes);
        bytes.push((crc >> 16) as u8);
        bytes.push((crc >> 8) as u8);
        bytes.push(crc as u8);
        bytes
    }

    #[test]
    fn rtcm_min_and_max_payload_parse() {
        let min = rtcm_frame(&[0xab]);
        match find_frame(&min, &FrameLimits::default()) {
            FindOutcome::Found { frame, .. } => assert_eq!(frame.payload().len(), 1),
            other => panic!("expected Found, got {other:?}"),
        }
        let max = rtcm_frame(&[0xcd; 1024]);
        match find_frame(&max, &FrameLimits::default()) {
            FindOutcome::Found { frame, .. } => assert_eq!(frame.payload().len(), 1024),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn rtcm_zero_length_is_rejected() {
        let bytes = rtcm_frame(&[]);
        assert_eq!(find_frame(&bytes, &FrameLimits::default()), FindOutcome::None);
    }

    #[test]
    fn nmea_minimum_length_sentence_parses() {
        // "$GPxxx*cs\r\n" — 9 bytes minimum excluding CRLF... build a minimal valid sentence.
        let body = b"GP,*";
        let mut bytes = vec![b'$'];
        bytes.extend_from_slice(&body[..body.len() - 1]);
        let cs = nmea_xor(&bytes[1..]);
        bytes.push(b'*');
        bytes.extend_from_slice(format!("{cs:02X}").as_bytes());
        bytes.extend_from_slice(b"\r\n");
        assert!(bytes.len() >= NMEA_MIN_FRAME_LEN);
        match find_frame(&bytes, &FrameLimits::default()) {
            FindOutcome::Found { frame, .. } => assert_eq!(frame.kind, FrameKind::Nmea),
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn nmea_missing_crlf_is_partial() {
        let bytes = b"$GPGGA,123*47".to_vec();
        match find_frame(&bytes, &FrameLimits::default()) {
            FindOutcome::Partial(hint) => assert_eq!(hint.kind, FrameKind::Nmea),
            other => panic!("expected Partial, got {other:?}"),
        }
    }

    #[test]
    fn nmea_bad_checksum_is_rejected() {
        let bytes = b"$GPGGA,123*00\r\n".to_vec();
        assert_eq!(find_frame(&bytes, &FrameLimits::default()), FindOutcome::None);
    }

    #[test]
    fn one_byte_at_a_time_matches_bulk_delivery() {
        let bytes = ubx_ack_ack();
        for split in 0..bytes.len() {
            let prefix_outcome = find_frame(&bytes[..split], &FrameLimits::default());
            if split < bytes.len() {
                assert!(matches!(
                    prefix_outcome,
                    FindOutcome::Partial(_) | FindOutcome::None
                ));
            }
        }
        match find_frame(&bytes, &FrameLimits::default()) {
            FindOutcome::Found { .. } => {},
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn earliest_offset_wins_across_protocols() {
        // NMEA sentence starting at offset 0, UBX frame starting later.
        let mut bytes = b"$GP,*".to_vec();
        let cs = nmea_xor(&bytes[1..bytes.len() - 1]);
        bytes = b"$GP,".to_vec();
        bytes.push(b'*');
        bytes.extend_from_slice(format!("{cs:02X}").as_bytes());
        bytes.extend_from_slice(b"\r\n");
        bytes.extend(ubx_ack_ack());
        match find_frame(&bytes, &FrameLimits::default()) {
            FindOutcome::Found { start_offset, frame, .. } => {
                assert_eq!(start_offset, 0);
                assert_eq!(frame.kind, FrameKind::Nmea);
            },
            other => panic!("expected Found, got {other:?}"),
        }
    }

    #[test]
    fn classify_rejection_reports_bad_checksum() {
        let mut bytes = ubx_ack_ack();
        *bytes.last_mut().unwrap() ^= 0xff;
        let reason = classify_rejection(&bytes, &FrameLimits::default());
        assert!(matches!(reason, FrameError::InvalidChecksum { .. }));
    }

    #[test]
    fn classify_rejection_reports_unknown_sync() {
        let bytes = vec![0xb5, 0x00, 0x00];
        let reason = classify_rejection(&bytes, &FrameLimits::default());
        assert_eq!(reason, FrameError::UnknownSync);
        let bytes = vec![0x00, 0x01, 0x02];
        assert_eq!(classify_rejection(&bytes, &FrameLimits::default()), FrameError::UnknownSync);
    }

    #[test]
    fn classify_rejection_reports_oversized_rtcm_length() {
        let bytes = rtcm_frame(&[0u8; 1024]);
        let reason = classify_rejection(&bytes, &FrameLimits { ubx_max_payload: 1024, rtcm_max_payload: 100 });
        assert!(matches!(reason, FrameError::InvalidLength { .. }));
    }
}
