//! C6 — RtcmRouter: outbound RTCM message-type gating plus inbound byte
//! passthrough (spec.md §4.6).
//!
//! Grounded on the teacher's `Device::send`/`recv` port-ownership pattern
//! (`ublox-device` example), redesigned per spec.md §9's single-owner flag:
//! the router holds a `RadioSink` trait object rather than sharing the port.

use tracing::warn;

use crate::constants::RTCM_ACCEPT_RANGES;
use crate::decoders::rtcm_message_type;
use crate::error::GatewayError;
use crate::frame::Frame;

/// The radio-sink interface consumed by C6 (spec.md §6.3).
pub trait RadioSink: Send {
    fn send(&mut self, rtcm_frame_bytes: &[u8]) -> std::io::Result<()>;
}

/// The receiver's byte-sink, used to inject inbound RTCM bytes (spec.md §6.2).
pub trait ByteSink: Send {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()>;
}

fn is_accepted_type(msg_type: u16) -> bool {
    RTCM_ACCEPT_RANGES
        .iter()
        .any(|&(lo, hi)| msg_type >= lo && msg_type < hi)
}

pub struct RtcmRouter<S: RadioSink, B: ByteSink> {
    radio_sink: S,
    receiver_sink: B,
    bytes_forwarded: u64,
}

impl<S: RadioSink, B: ByteSink> RtcmRouter<S, B> {
    pub fn new(radio_sink: S, receiver_sink: B) -> Self {
        Self {
            radio_sink,
            receiver_sink,
            bytes_forwarded: 0,
        }
    }

    pub fn bytes_forwarded(&self) -> u64 {
        self.bytes_forwarded
    }

    /// Forward an extracted RTCM3 frame to the radio link if its message
    /// type is in the accepted range (spec.md §4.6). Non-fatal on send failure.
    pub fn route_outbound(&mut self, frame: &Frame) {
        let Some(msg_type) = rtcm_message_type(frame.payload()) else {
            warn!("RTCM frame too short to carry a message type, dropping");
            return;
        };
        if !is_accepted_type(msg_type) {
            warn!(msg_type, "RTCM message type outside accepted range, dropping");
            return;
        }
        match self.radio_sink.send(&frame.bytes) {
            Ok(()) => self.bytes_forwarded += frame.bytes.len() as u64,
            Err(e) => warn!(error = %e, "radio send failed, dropping frame"),
        }
    }

    /// Inject bytes received from the radio link back into the receiver
    /// (spec.md §4.6 "Inbound"). Logged and non-fatal on failure.
    pub fn route_inbound(&mut self, bytes: &[u8]) -> Result<(), GatewayError> {
        if let Err(e) = self.receiver_sink.write(bytes) {
            warn!(error = %e, "inbound RTCM write to receiver failed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::frame::FrameKind;

    struct RecordingSink {
        sent: Vec<Vec<u8>>,
    }
    impl RadioSink for RecordingSink {
        fn send(&mut self, bytes: &[u8]) -> std::io::Result<()> {
            self.sent.push(bytes.to_vec());
            Ok(())
        }
    }
    impl ByteSink for RecordingSink {
        fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
            self.sent.push(bytes.to_vec());
            Ok(())
        }
    }

    /// `msg_type` must fit in 12 bits, matching the real wire field.
    fn rtcm_frame(msg_type: u16) -> Frame {
        assert!(msg_type < 4096);
        let high = (msg_type >> 4) as u8;
        let low = ((msg_type & 0xf) << 4) as u8;
        let bytes = vec![0xd3, 0x00, 0x02, high, low, 0, 0, 0]; // fake CRC, unchecked here.
        Frame::new(FrameKind::Rtcm3, bytes)
    }

    #[test]
    fn accepted_type_is_forwarded() {
        let mut router = RtcmRouter::new(RecordingSink { sent: vec![] }, RecordingSink { sent: vec![] });
        router.route_outbound(&rtcm_frame(1077));
        assert_eq!(router.radio_sink.sent.len(), 1);
        assert!(router.bytes_forwarded() > 0);
    }

    #[test]
    fn type_outside_range_is_dropped() {
        let mut router = RtcmRouter::new(RecordingSink { sent: vec![] }, RecordingSink { sent: vec![] });
        router.route_outbound(&rtcm_frame(2000));
        assert!(router.radio_sink.sent.is_empty());
    }

    #[test]
    fn boundary_types_are_accepted() {
        let mut router = RtcmRouter::new(RecordingSink { sent: vec![] }, RecordingSink { sent: vec![] });
        router.route_outbound(&rtcm_frame(1000));
        router.route_outbound(&rtcm_frame(1299));
        router.route_outbound(&rtcm_frame(4000));
        router.route_outbound(&rtcm_frame(4095));
        assert_eq!(router.radio_sink.sent.len(), 4);
    }

    #[test]
    fn boundary_types_just_outside_range_are_dropped() {
        let mut router = RtcmRouter::new(RecordingSink { sent: vec![] }, RecordingSink { sent: vec![] });
        router.route_outbound(&rtcm_frame(999));
        router.route_outbound(&rtcm_frame(1300));
        router.route_outbound(&rtcm_frame(3999));
        assert!(router.radio_sink.sent.is_empty());
    }

    #[test]
    fn inbound_bytes_are_written_to_receiver_sink() {
        let mut router = RtcmRouter::new(RecordingSink { sent: vec![] }, RecordingSink { sent: vec![] });
        router.route_inbound(&[1, 2, 3]).unwrap();
        assert_eq!(router.receiver_sink.sent, vec![vec![1, 2, 3]]);
    }
}
