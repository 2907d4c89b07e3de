//! Frame-synchronized UBX/RTCM3/NMEA demultiplexer and correction-status
//! aggregator for u-blox high-precision GNSS receivers.
//!
//! The crate is organized as the component graph it implements:
//! [`frame_finder`] and [`demux`] resynchronize and extract frames from one
//! interleaved byte stream, [`decoders`] turns frames into
//! [`events::TypedEvent`]s, [`correction_store`] and [`correction_aggregator`]
//! reconcile those events into a single correction status, and
//! [`rtcm_router`]/[`rate_meter`] cover the outbound RTCM bridge and telemetry
//! rate accounting. [`runtime`] wires all of it into the actor graph a caller
//! actually runs.

mod buffer;
mod checksum;
pub mod config;
pub mod constants;
pub mod correction_aggregator;
pub mod correction_store;
pub mod decoders;
pub mod demux;
pub mod error;
pub mod events;
mod frame;
pub mod frame_finder;
pub mod rate_meter;
pub mod rtcm_router;
pub mod runtime;
pub mod wgs84;

pub use crate::{
    config::GatewayConfig,
    correction_aggregator::{AggregatorConfig, CorrectionAggregator},
    correction_store::CorrectionStore,
    demux::{Demultiplexer, DrainResult},
    error::{DecodeError, FrameError, GatewayError},
    events::TypedEvent,
    frame::{FindOutcome, Frame, FrameKind, PartialHint},
    frame_finder::{find_frame, FrameLimits},
    rate_meter::RateMeter,
    rtcm_router::{ByteSink, RadioSink, RtcmRouter},
    runtime::{ByteSource, CancellationToken, EventSink, GatewayRuntime},
};
