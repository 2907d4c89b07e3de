//! `TypedEvent` and its payload types (spec.md §3, §6.4).
//!
//! Grounded on the legacy `Packet` enum dispatch in the teacher's old
//! `src/lib.rs`: one tagged union published through a single channel, rather
//! than per-message dynamically-typed dictionaries (spec.md §9 redesign flag).

use std::time::Instant;

use chrono::{DateTime, Utc};

/// Monotonic + wall-clock stamp attached to every decoded event.
#[derive(Debug, Clone, Copy)]
pub struct EventTimestamp {
    pub monotonic: Instant,
    pub wall_clock: DateTime<Utc>,
}

impl EventTimestamp {
    pub fn now() -> Self {
        Self {
            monotonic: Instant::now(),
            wall_clock: Utc::now(),
        }
    }

    /// Elapsed time since this stamp was taken, using the monotonic clock.
    pub fn elapsed(&self) -> std::time::Duration {
        self.monotonic.elapsed()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixType {
    NoFix,
    DeadReckoning,
    Fix2D,
    Fix3D,
    GnssDeadReckoning,
    TimeOnly,
}

impl FixType {
    pub fn from_u8(v: u8) -> Self {
        match v {
            1 => FixType::DeadReckoning,
            2 => FixType::Fix2D,
            3 => FixType::Fix3D,
            4 => FixType::GnssDeadReckoning,
            5 => FixType::TimeOnly,
            _ => FixType::NoFix,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierSolution {
    None,
    Float,
    Fixed,
}

impl CarrierSolution {
    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            1 => CarrierSolution::Float,
            2 => CarrierSolution::Fixed,
            _ => CarrierSolution::None,
        }
    }
}

/// NAV-PVT (spec.md §4.3 Table 1 fix-label computation lives in `decoders::nav_pvt`).
#[derive(Debug, Clone)]
pub struct PositionFix {
    pub itow_ms: u32,
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub min: u8,
    pub sec: u8,
    pub valid_date: bool,
    pub valid_time: bool,
    pub fully_resolved: bool,
    pub fix_type: FixType,
    pub gnss_fix_ok: bool,
    pub diff_soln: bool,
    pub carr_soln: CarrierSolution,
    pub num_sv: u8,
    pub lon_deg: f64,
    pub lat_deg: f64,
    pub height_ellipsoid_mm: i32,
    pub height_msl_mm: i32,
    pub h_acc_mm: u32,
    pub v_acc_mm: u32,
    pub diff_age_ms: Option<u16>,
    pub label: &'static str,
    pub timestamp: EventTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GnssId {
    Gps,
    Sbas,
    Galileo,
    Beidou,
    Imes,
    Qzss,
    Glonass,
    Other(u8),
}

impl GnssId {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => GnssId::Gps,
            1 => GnssId::Sbas,
            2 => GnssId::Galileo,
            3 => GnssId::Beidou,
            4 => GnssId::Imes,
            5 => GnssId::Qzss,
            6 => GnssId::Glonass,
            other => GnssId::Other(other),
        }
    }
}

/// NAV-SAT per-SV entry.
#[derive(Debug, Clone, Copy)]
pub struct SatInfo {
    pub gnss_id: GnssId,
    pub sv_id: u8,
    pub cno_dbhz: u8,
    pub elev_deg: i8,
    pub azim_deg: i16,
    pub pr_res_m: f64,
    pub quality_ind: u8,
    pub sv_used: bool,
    pub health: u8,
    pub diff_corr: bool,
    pub smoothed: bool,
}

#[derive(Debug, Clone)]
pub struct SatelliteSnapshot {
    pub sats: Vec<SatInfo>,
    pub sbas_in_use: bool,
    pub diff_corr_in_use: bool,
    pub diff_corr_count: u32,
    pub timestamp: EventTimestamp,
}

/// NAV-DOP, each field ×0.01.
#[derive(Debug, Clone, Copy)]
pub struct Dop {
    pub gdop: f64,
    pub pdop: f64,
    pub tdop: f64,
    pub vdop: f64,
    pub hdop: f64,
    pub ndop: f64,
    pub edop: f64,
    pub timestamp: EventTimestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct SurveyIn {
    pub duration_s: u32,
    pub mean_ecef_cm: (i32, i32, i32),
    pub mean_ecef_hp_tenth_mm: (i8, i8, i8),
    pub mean_acc_tenth_mm: u32,
    pub observations: u32,
    pub valid: bool,
    pub active: bool,
    pub timestamp: EventTimestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct SignalEntry {
    pub gnss_id: GnssId,
    pub sv_id: u8,
    pub cno_dbhz: u8,
    pub quality: u8,
    pub health: u8,
    pub pr_used: bool,
    pub cr_used: bool,
    pub do_used: bool,
    pub corrections_used: u8,
}

#[derive(Debug, Clone)]
pub struct SignalInfo {
    pub signals: Vec<SignalEntry>,
    pub timestamp: EventTimestamp,
}

/// RTCM 1005 reference-station ARP, ECEF decode plus WGS-84 geodetic conversion.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceStation {
    pub station_id: u16,
    pub ecef_x_m: f64,
    pub ecef_y_m: f64,
    pub ecef_z_m: f64,
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub height_m: f64,
    pub timestamp: EventTimestamp,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PortStats {
    pub tx_bytes: u32,
    pub rx_bytes: u32,
    pub tx_usage_pct: u8,
    pub rx_usage_pct: u8,
    pub tx_overruns: bool,
    pub rx_overruns: bool,
    /// 8-slot protocol message counters: 0=UBX, 1=NMEA, 5=RTCM3, others reserved.
    pub protocol_msg_counts: [u32; 8],
}

#[derive(Debug, Clone)]
pub struct CommsStatus {
    pub ports: Vec<PortStats>,
    pub timestamp: EventTimestamp,
}

#[derive(Debug, Clone)]
pub struct ReceiverVersion {
    pub sw_version: String,
    pub hw_version: String,
    pub extensions: Vec<String>,
    pub timestamp: EventTimestamp,
}

#[derive(Debug, Clone)]
pub enum BroadcastPayload {
    /// Entire NMEA sentence, CRLF restored, forwarded to the NMEA relay sink.
    Nmea { tag: String, sentence: String },
    RxmSfrbx { gnss_id: GnssId, sv_id: u8 },
    RxmRawx { num_meas: u8 },
}

#[derive(Debug, Clone)]
pub struct Broadcast {
    pub payload: BroadcastPayload,
    pub timestamp: EventTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionSource {
    Spartn,
    Rtcm,
    Dgps,
    Sbas,
    None,
}

impl CorrectionSource {
    pub fn label(&self) -> &'static str {
        match self {
            CorrectionSource::Spartn => "SPARTN",
            CorrectionSource::Rtcm => "RTCM",
            CorrectionSource::Dgps => "DGPS",
            CorrectionSource::Sbas => "SBAS",
            CorrectionSource::None => "None",
        }
    }
}

/// C5's reconciled output (spec.md §3, §4.5). `status_label` is a
/// human-readable rendering of `source` plus validity/staleness, distinct
/// from `source` itself so change-detection (spec.md §8) can catch a
/// valid/stale transition even on ticks where `source` doesn't change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrectionStatus {
    pub source: CorrectionSource,
    pub status_label: &'static str,
    pub valid: bool,
    pub stale: bool,
    pub age_ms: Option<u32>,
    pub flags: u16,
}

impl CorrectionStatus {
    /// `source` plus a stale/invalid qualifier, e.g. "RTCM", "RTCM (stale)",
    /// "None".
    pub fn label_for(source: CorrectionSource, valid: bool, stale: bool) -> &'static str {
        use CorrectionSource::*;
        match (source, valid, stale) {
            (None, _, _) => "None",
            (Spartn, true, false) => "SPARTN",
            (Spartn, _, _) => "SPARTN (stale)",
            (Rtcm, true, false) => "RTCM",
            (Rtcm, _, _) => "RTCM (stale)",
            (Dgps, true, false) => "DGPS",
            (Dgps, _, _) => "DGPS (stale)",
            (Sbas, true, false) => "SBAS",
            (Sbas, _, _) => "SBAS (stale)",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AckNak {
    pub acked_class: u8,
    pub acked_id: u8,
    pub ack: bool,
    pub timestamp: EventTimestamp,
}

#[derive(Debug, Clone)]
pub struct MessageRates {
    pub rates: Vec<(String, f64)>,
    pub timestamp: EventTimestamp,
}

#[derive(Debug, Clone, Copy)]
pub struct DataRates {
    pub inbound_kbps: f64,
    pub outbound_kbps: f64,
    pub timestamp: EventTimestamp,
}

/// The single sum type published through the event channel (spec.md §6.4).
#[derive(Debug, Clone)]
pub enum TypedEvent {
    PvtUpdate(PositionFix),
    SatelliteUpdate(SatelliteSnapshot),
    DopUpdate(Dop),
    SurveyInStatus(SurveyIn),
    NavigationSignalUpdate(SignalInfo),
    VersionUpdate(ReceiverVersion),
    CommunicationStatusUpdate(CommsStatus),
    BroadcastDataUpdate(Broadcast),
    CorrectionStatusUpdate(CorrectionStatus, EventTimestamp),
    ReferenceStationPosition(ReferenceStation),
    MessageRatesUpdate(MessageRates),
    DataRatesUpdate(DataRates),
    Acknowledgement(AckNak),
}
