use core::fmt;

/// Error kinds from spec.md §7. Only [`GatewayError::ByteSource`] and
/// [`GatewayError::Cancelled`] are ever surfaced to a caller as fatal; every
/// other kind is logged and recovered from inline by the component that hit it.
#[derive(Debug)]
pub enum GatewayError {
    ByteSource(std::io::Error),
    Cancelled,
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::ByteSource(e) => write!(f, "byte source error: {e}"),
            GatewayError::Cancelled => f.write_str("cancellation requested"),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::ByteSource(e) => Some(e),
            GatewayError::Cancelled => None,
        }
    }
}

/// Reasons a candidate frame was rejected by [`crate::frame_finder`] (spec.md §4.1).
/// These are never surfaced; they exist so the demultiplexer can log forensic
/// context for a `TransientByteLoss` event without re-deriving the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    InvalidChecksum { expect: u32, got: u32 },
    InvalidLength { got: usize },
    InvalidAscii,
    /// The lead byte matches a protocol's sync character but what follows
    /// doesn't, or no known sync character matches at all.
    UnknownSync,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::InvalidChecksum { expect, got } => {
                write!(f, "checksum mismatch: expected 0x{expect:x}, got 0x{got:x}")
            },
            FrameError::InvalidLength { got } => write!(f, "invalid payload length {got}"),
            FrameError::InvalidAscii => f.write_str("non-ASCII byte in NMEA sentence body"),
            FrameError::UnknownSync => f.write_str("no recognized frame sync at this offset"),
        }
    }
}

impl std::error::Error for FrameError {}

/// `DecoderPayloadError` from spec.md §7: a frame was recognized and
/// checksum-valid, but its payload is too short for the message type it
/// claims to be. Discarded by C2/C3; never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeError {
    pub message: &'static str,
    pub expected_min_len: usize,
    pub got_len: usize,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: payload too short, need >= {} bytes, got {}",
            self.message, self.expected_min_len, self.got_len
        )
    }
}

impl std::error::Error for DecodeError {}
