//! Frame and partial-frame types shared by [`crate::frame_finder`] and
//! [`crate::demux`] (spec.md §3).

use core::fmt;

/// Which of the three multiplexed wire protocols a [`Frame`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    Ubx,
    Rtcm3,
    Nmea,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Ubx => f.write_str("UBX"),
            FrameKind::Rtcm3 => f.write_str("RTCM3"),
            FrameKind::Nmea => f.write_str("NMEA"),
        }
    }
}

/// A complete, checksum/CRC-valid frame (spec.md §3).
///
/// `bytes` is the full wire encoding, sync bytes through trailer, so that
/// [`crate::rtcm_router`] can forward RTCM frames verbatim and so
/// round-tripping (encode -> [`crate::frame_finder::find_frame`] -> same
/// bytes) is checkable directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: FrameKind,
    pub bytes: Box<[u8]>,
}

impl Frame {
    pub fn new(kind: FrameKind, bytes: impl Into<Box<[u8]>>) -> Self {
        Self {
            kind,
            bytes: bytes.into(),
        }
    }

    /// UBX: `class`/`id` header fields. Panics if this isn't a UBX frame or
    /// is shorter than the header; callers only call this after `kind` has
    /// already been checked.
    pub fn ubx_class_id(&self) -> (u8, u8) {
        debug_assert_eq!(self.kind, FrameKind::Ubx);
        (self.bytes[2], self.bytes[3])
    }

    /// The payload, i.e. the frame with sync/header/checksum trimmed off.
    pub fn payload(&self) -> &[u8] {
        match self.kind {
            FrameKind::Ubx => &self.bytes[6..self.bytes.len() - 2],
            FrameKind::Rtcm3 => &self.bytes[3..self.bytes.len() - 3],
            FrameKind::Nmea => &self.bytes[1..self.bytes.len() - 2],
        }
    }
}

/// Returned by [`crate::frame_finder::find_frame`] in place of a [`Frame`]
/// when the earliest plausible candidate is incomplete (spec.md §3/§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialHint {
    pub kind: FrameKind,
    pub bytes_needed: usize,
}

/// The three-way outcome of a single [`crate::frame_finder::find_frame`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FindOutcome {
    Found {
        frame: Frame,
        start_offset: usize,
    },
    Partial(PartialHint),
    None,
}
