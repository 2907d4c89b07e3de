//! C3 — per-message-type pure decode functions (spec.md §4.3), dispatched by
//! frame kind and class/id/message-type.

pub mod ack;
pub mod mon_comms;
pub mod mon_ver;
pub mod nav_dop;
pub mod nav_pvt;
pub mod nav_sat;
pub mod nav_sig;
pub mod nav_svin;
pub mod nmea;
pub mod rtcm1005;
pub mod rxm;

use crate::error::DecodeError;
use crate::events::TypedEvent;
use crate::frame::{Frame, FrameKind};

/// Result of dispatching one frame to its decoder.
pub enum DecodeOutcome {
    /// A curated-set message decoded into a publishable event.
    Event(TypedEvent),
    /// RXM-COR decoded successfully; routed to the correction store/aggregator
    /// rather than published directly (spec.md §4.4, §4.5).
    RxmCor(rxm::RxmCor),
    /// Frame kind/class/id recognized but outside the curated decoder set
    /// (spec.md Non-goals); still counted by the rate meter.
    NotDecoded,
    /// Recognized message type, but the payload was too short (spec.md §7
    /// `DecoderPayloadError`).
    Error(DecodeError),
}

/// The C7 rate-meter key for a frame, independent of whether it decodes.
pub fn message_key(frame: &Frame) -> String {
    match frame.kind {
        FrameKind::Ubx => {
            let (class, id) = frame.ubx_class_id();
            format!("UBX.{}", ubx_key_name(class, id))
        },
        FrameKind::Rtcm3 => {
            let payload = frame.payload();
            let msg_type = rtcm_message_type(payload).unwrap_or(0);
            format!("RTCM3.{msg_type}")
        },
        FrameKind::Nmea => {
            let tag = std::str::from_utf8(&frame.bytes[1..frame.bytes.len().min(6)]).unwrap_or("?????");
            format!("NMEA.{tag}")
        },
    }
}

fn ubx_key_name(class: u8, id: u8) -> &'static str {
    match (class, id) {
        (nav_pvt::CLASS, nav_pvt::ID) => "NAV_PVT",
        (nav_sat::CLASS, nav_sat::ID) => "NAV_SAT",
        (nav_dop::CLASS, nav_dop::ID) => "NAV_DOP",
        (nav_svin::CLASS, nav_svin::ID) => "NAV_SVIN",
        (nav_sig::CLASS, nav_sig::ID) => "NAV_SIG",
        (mon_ver::CLASS, mon_ver::ID) => "MON_VER",
        (mon_comms::CLASS, mon_comms::ID) => "MON_COMMS",
        (rxm::sfrbx::CLASS, rxm::sfrbx::ID) => "RXM_SFRBX",
        (rxm::rawx::CLASS, rxm::rawx::ID) => "RXM_RAWX",
        (rxm::cor::CLASS, rxm::cor::ID) => "RXM_COR",
        (ack::CLASS, ack::ID_ACK) => "ACK_ACK",
        (ack::CLASS, ack::ID_NAK) => "ACK_NAK",
        _ => "UNKNOWN",
    }
}

/// First 12 bits of an RTCM payload (spec.md §4.6).
pub fn rtcm_message_type(payload: &[u8]) -> Option<u16> {
    if payload.len() < 2 {
        return None;
    }
    Some((u16::from(payload[0]) << 4) | (u16::from(payload[1]) >> 4))
}

pub fn decode(frame: &Frame) -> DecodeOutcome {
    match frame.kind {
        FrameKind::Ubx => decode_ubx(frame),
        FrameKind::Rtcm3 => decode_rtcm(frame),
        FrameKind::Nmea => match nmea::decode(&frame.bytes) {
            Ok(broadcast) => DecodeOutcome::Event(TypedEvent::BroadcastDataUpdate(broadcast)),
            Err(e) => DecodeOutcome::Error(e),
        },
    }
}

fn decode_ubx(frame: &Frame) -> DecodeOutcome {
    let (class, id) = frame.ubx_class_id();
    let payload = frame.payload();
    match (class, id) {
        (nav_pvt::CLASS, nav_pvt::ID) => match nav_pvt::decode(payload) {
            Ok(fix) => DecodeOutcome::Event(TypedEvent::PvtUpdate(fix)),
            Err(e) => DecodeOutcome::Error(e),
        },
        (nav_sat::CLASS, nav_sat::ID) => match nav_sat::decode(payload) {
            Ok(snap) => DecodeOutcome::Event(TypedEvent::SatelliteUpdate(snap)),
            Err(e) => DecodeOutcome::Error(e),
        },
        (nav_dop::CLASS, nav_dop::ID) => match nav_dop::decode(payload) {
            Ok(dop) => DecodeOutcome::Event(TypedEvent::DopUpdate(dop)),
            Err(e) => DecodeOutcome::Error(e),
        },
        (nav_svin::CLASS, nav_svin::ID) => match nav_svin::decode(payload) {
            Ok(svin) => DecodeOutcome::Event(TypedEvent::SurveyInStatus(svin)),
            Err(e) => DecodeOutcome::Error(e),
        },
        (nav_sig::CLASS, nav_sig::ID) => match nav_sig::decode(payload) {
            Ok(sig) => DecodeOutcome::Event(TypedEvent::NavigationSignalUpdate(sig)),
            Err(e) => DecodeOutcome::Error(e),
        },
        (mon_ver::CLASS, mon_ver::ID) => match mon_ver::decode(payload) {
            Ok(ver) => DecodeOutcome::Event(TypedEvent::VersionUpdate(ver)),
            Err(e) => DecodeOutcome::Error(e),
        },
        (mon_comms::CLASS, mon_comms::ID) => match mon_comms::decode(payload) {
            Ok(comms) => DecodeOutcome::Event(TypedEvent::CommunicationStatusUpdate(comms)),
            Err(e) => DecodeOutcome::Error(e),
        },
        (rxm::sfrbx::CLASS, rxm::sfrbx::ID) => match rxm::sfrbx::decode(payload) {
            Ok(payload) => DecodeOutcome::Event(TypedEvent::BroadcastDataUpdate(crate::events::Broadcast {
                payload,
                timestamp: crate::events::EventTimestamp::now(),
            })),
            Err(e) => DecodeOutcome::Error(e),
        },
        (rxm::rawx::CLASS, rxm::rawx::ID) => match rxm::rawx::decode(payload) {
            Ok(payload) => DecodeOutcome::Event(TypedEvent::BroadcastDataUpdate(crate::events::Broadcast {
                payload,
                timestamp: crate::events::EventTimestamp::now(),
            })),
            Err(e) => DecodeOutcome::Error(e),
        },
        (rxm::cor::CLASS, rxm::cor::ID) => match rxm::cor::decode(payload) {
            Ok(cor) => DecodeOutcome::RxmCor(cor),
            Err(e) => DecodeOutcome::Error(e),
        },
        (ack::CLASS, ack::ID_ACK) | (ack::CLASS, ack::ID_NAK) => match ack::decode(id, payload) {
            Ok(ack) => DecodeOutcome::Event(TypedEvent::Acknowledgement(ack)),
            Err(e) => DecodeOutcome::Error(e),
        },
        _ => DecodeOutcome::NotDecoded,
    }
}

fn decode_rtcm(frame: &Frame) -> DecodeOutcome {
    let payload = frame.payload();
    match rtcm_message_type(payload) {
        Some(rtcm1005::MESSAGE_TYPE) => match rtcm1005::decode(payload) {
            Ok(station) => DecodeOutcome::Event(TypedEvent::ReferenceStationPosition(station)),
            Err(e) => DecodeOutcome::Error(e),
        },
        _ => DecodeOutcome::NotDecoded,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rtcm_message_type_extracts_first_twelve_bits() {
        // type 1005 = 0x3ED -> first byte 0x3E, high nibble of second byte 0xD.
        let payload = [0x3e, 0xd0];
        assert_eq!(rtcm_message_type(&payload), Some(1005));
    }

    #[test]
    fn ubx_message_key_names_known_types() {
        let frame = Frame::new(FrameKind::Ubx, vec![0xb5, 0x62, 0x01, 0x07, 0, 0, 0, 0]);
        assert_eq!(message_key(&frame), "UBX.NAV_PVT");
    }
}
