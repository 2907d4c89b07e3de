//! Wire-format constants for the three multiplexed protocols (spec.md §6.1).

pub const UBX_SYNC_CHAR_1: u8 = 0xb5;
pub const UBX_SYNC_CHAR_2: u8 = 0x62;
pub(crate) const UBX_SYNC_SIZE: usize = 2;
pub(crate) const UBX_CLASS_LEN: usize = 1;
pub(crate) const UBX_ID_LEN: usize = 1;
pub(crate) const UBX_PAYLOAD_SIZE_LEN: usize = 2;
pub(crate) const UBX_HEADER_LEN: usize =
    UBX_SYNC_SIZE + UBX_CLASS_LEN + UBX_ID_LEN + UBX_PAYLOAD_SIZE_LEN;
pub(crate) const UBX_CHECKSUM_LEN: usize = 2;

pub(crate) const UBX_CLASS_OFFSET: usize = 2; // after SYNC_CHAR_1, SYNC_CHAR_2
pub(crate) const UBX_MSG_ID_OFFSET: usize = 3; // after CLASS
pub(crate) const UBX_LENGTH_OFFSET: usize = 4; // after MSG_ID

/// Default `UBX_MAX_PAYLOAD` (spec.md §6.5): `0 <= L <= 1024`.
pub const UBX_MAX_PAYLOAD_DEFAULT: u16 = 1024;

pub const RTCM_SYNC_CHAR: u8 = 0xd3;
pub(crate) const RTCM_HEADER_SIZE: usize = 3; // sync (1) + length field (2)
pub(crate) const RTCM_LENGTH_MASK: u16 = 0x03ff; // 10 bits of length, 6 reserved
pub(crate) const RTCM_CRC_LEN: usize = 3;

/// The 10-bit length field can only directly represent 0..=1023, one short of
/// the `1 <= P <= 1024` range spec.md §4.1/§6.5 requires. The all-ones
/// encoding (0x3ff), which would otherwise mean `P = 1023`, is reserved to
/// mean `P = 1024` instead, so the required upper boundary is representable
/// at the cost of one otherwise-unremarkable length (1023) never appearing.
pub(crate) const RTCM_LENGTH_ESCAPE: u16 = 0x03ff;
pub(crate) const RTCM_LENGTH_ESCAPED_VALUE: u16 = 1024;

/// Default `RTCM_MAX_PAYLOAD` (spec.md §6.5).
pub const RTCM_MAX_PAYLOAD_DEFAULT: u16 = 1024;

pub const NMEA_SYNC_CHAR: u8 = b'$';
pub(crate) const NMEA_END_CHAR_1: u8 = b'\r';
pub(crate) const NMEA_END_CHAR_2: u8 = b'\n';
pub(crate) const NMEA_END_CHARS_LEN: usize = 2;
/// Minimum complete NMEA sentence length (spec.md §4.1: "length must be >= 9 bytes").
pub(crate) const NMEA_MIN_FRAME_LEN: usize = 9;
/// Practical upper bound past which an unterminated NMEA candidate is garbage, not partial.
pub(crate) const NMEA_MAX_SENTENCE_LEN: usize = 82;

/// `MAX_BUFFER_BYTES` default (spec.md §6.5): 1 MiB.
pub const MAX_BUFFER_BYTES_DEFAULT: usize = 1024 * 1024;
/// `MAX_FRAMES_PER_DRAIN` default (spec.md §6.5).
pub const MAX_FRAMES_PER_DRAIN_DEFAULT: usize = 50;
/// `RATE_WINDOW_S` default (spec.md §6.5).
pub const RATE_WINDOW_S_DEFAULT: f64 = 5.0;
/// `MIN_EMIT_INTERVAL_MS` default (spec.md §6.5 / §4.5).
pub const MIN_EMIT_INTERVAL_MS_DEFAULT: u64 = 1000;
/// Staleness thresholds (spec.md §6.5).
pub const RXM_COR_STALE_S_DEFAULT: f64 = 5.0;
pub const NAV_SAT_STALE_S_DEFAULT: f64 = 5.0;
pub const NAV_PVT_STALE_S_DEFAULT: f64 = 2.0;
/// Valid outbound RTCM message-type ranges (spec.md §4.6).
pub const RTCM_ACCEPT_RANGES: [(u16, u16); 2] = [(1000, 1300), (4000, 4100)];
