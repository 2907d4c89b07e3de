//! C5 — CorrectionAggregator: priority ladder + staleness + throttle +
//! change-detection over [`crate::correction_store::CorrectionStore`]
//! (spec.md §4.5).
//!
//! No direct teacher precedent; the throttle/memo shape echoes
//! `Device::wait_for_ack`'s single-outstanding-request bookkeeping
//! (`ublox-device` example), redirected at emission timing instead of
//! acknowledgement matching.

use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::correction_store::{CorrectionSnapshot, CorrectionStore};
use crate::decoders::rxm::RxmCorSource;
use crate::events::{CarrierSolution, CorrectionSource, CorrectionStatus};

#[derive(Debug, Clone, Copy)]
pub struct AggregatorConfig {
    pub min_emit_interval: Duration,
    pub rxm_cor_stale: Duration,
    pub nav_sat_stale: Duration,
    pub nav_pvt_stale: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        use crate::constants::*;
        Self {
            min_emit_interval: Duration::from_millis(MIN_EMIT_INTERVAL_MS_DEFAULT),
            rxm_cor_stale: Duration::from_secs_f64(RXM_COR_STALE_S_DEFAULT),
            nav_sat_stale: Duration::from_secs_f64(NAV_SAT_STALE_S_DEFAULT),
            nav_pvt_stale: Duration::from_secs_f64(NAV_PVT_STALE_S_DEFAULT),
        }
    }
}

struct State {
    last_emitted: Option<CorrectionStatus>,
    last_emit_at: Option<Instant>,
}

pub struct CorrectionAggregator {
    config: AggregatorConfig,
    state: Mutex<State>,
}

impl CorrectionAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self {
            config,
            state: Mutex::new(State {
                last_emitted: None,
                last_emit_at: None,
            }),
        }
    }

    /// Called by decoders that update C4 (`on_update`) and by the periodic
    /// staleness timer. Returns `Some` only when an emission should happen.
    pub fn evaluate(&self, store: &CorrectionStore, now: Instant) -> Option<CorrectionStatus> {
        let mut state = self.state.lock();
        if let Some(last) = state.last_emit_at {
            if now.duration_since(last) < self.config.min_emit_interval {
                return None;
            }
        }

        let snapshot = store.snapshot();
        let candidate = self.select(&snapshot, now);

        if state.last_emitted == Some(candidate) {
            return None;
        }

        state.last_emitted = Some(candidate);
        state.last_emit_at = Some(now);
        Some(candidate)
    }

    fn select(&self, snapshot: &CorrectionSnapshot, now: Instant) -> CorrectionStatus {
        // Rung 1: SPARTN via RXM-COR.
        if let Some(cor) = snapshot.rxm_cor {
            if cor.spartn && age(cor.received_at.monotonic, now) <= self.config.rxm_cor_stale {
                return status(CorrectionSource::Spartn, cor.valid, cor.stale, Some(cor.age_ms), 0);
            }
        }

        // Rung 2: RTCM/DGPS via NAV-PVT.
        if let Some(pvt) = snapshot.nav_pvt {
            if pvt.diff_soln && age(pvt.received_at.monotonic, now) <= self.config.nav_pvt_stale {
                let source = match pvt.carrier_solution {
                    CarrierSolution::Float | CarrierSolution::Fixed => CorrectionSource::Rtcm,
                    CarrierSolution::None => CorrectionSource::Dgps,
                };
                return status(source, true, false, pvt.diff_age_ms.map(u32::from), 0x21);
            }
        }

        // Rung 3: SBAS via NAV-SAT.
        if let Some(nav_sat) = snapshot.nav_sat {
            if nav_sat.sbas_in_use
                && nav_sat.diff_corr_in_use
                && age(nav_sat.received_at.monotonic, now) <= self.config.nav_sat_stale
            {
                return status(CorrectionSource::Sbas, true, false, None, 0x11);
            }
        }

        // Rung 4: RTCM/SBAS via RXM-COR fallback.
        if let Some(cor) = snapshot.rxm_cor {
            if (cor.rtcm || cor.sbas) && age(cor.received_at.monotonic, now) <= self.config.rxm_cor_stale {
                let source = match cor.priority_source() {
                    RxmCorSource::Rtcm => CorrectionSource::Rtcm,
                    RxmCorSource::Sbas => CorrectionSource::Sbas,
                    RxmCorSource::Spartn => CorrectionSource::Spartn,
                    RxmCorSource::None => CorrectionSource::None,
                };
                return status(source, cor.valid, cor.stale, Some(cor.age_ms), 0);
            }
        }

        // Rung 5: nothing usable.
        status(CorrectionSource::None, false, false, None, 0)
    }
}

fn status(
    source: CorrectionSource,
    valid: bool,
    stale: bool,
    age_ms: Option<u32>,
    flags: u16,
) -> CorrectionStatus {
    CorrectionStatus {
        source,
        status_label: CorrectionStatus::label_for(source, valid, stale),
        valid,
        stale,
        age_ms,
        flags,
    }
}

fn age(received_at: Instant, now: Instant) -> Duration {
    now.saturating_duration_since(received_at)
}
